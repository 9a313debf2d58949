use clap::Args;

use crate::sh::{ShOptions, ShOptionsBuilder, StreamMode};

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Path to YAML config (defaults to `<workspace>/sweep.yaml`)
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Only run entries for these programs (repeatable).
    ///
    /// Example: `xtask sweep -p dot-product`
    #[arg(short = 'p', long = "program")]
    pub programs: Vec<String>,

    /// Override the machine label from the config
    #[arg(long)]
    pub host: Option<String>,

    /// Print the planned runs without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Print commands as they run
    #[arg(long)]
    pub verbose: bool,
}

#[derive(serde::Deserialize, Debug)]
struct SweepConfig {
    #[serde(default)]
    host: Option<String>,
    #[serde(default = "default_release")]
    release: bool,
    runs: Vec<SweepEntry>,
}

fn default_release() -> bool {
    true
}

#[derive(serde::Deserialize, Debug)]
#[serde(untagged)]
enum Counts {
    /// `sizes: 1000`
    One(usize),
    /// `sizes: [500, 1000]` (nested lists flatten, so YAML aliases expand cleanly)
    Many(Vec<CountElem>),
}

#[derive(serde::Deserialize, Debug)]
#[serde(untagged)]
enum CountElem {
    One(usize),
    Many(Vec<CountElem>),
}

impl Counts {
    fn flatten(&self) -> Vec<usize> {
        fn walk(e: &CountElem, out: &mut Vec<usize>) {
            match e {
                CountElem::One(n) => out.push(*n),
                CountElem::Many(v) => v.iter().for_each(|inner| walk(inner, out)),
            }
        }

        match self {
            Counts::One(n) => vec![*n],
            Counts::Many(v) => {
                let mut out = Vec::new();
                v.iter().for_each(|e| walk(e, &mut out));
                out
            }
        }
    }
}

#[derive(serde::Deserialize, Debug)]
struct SweepEntry {
    program: String,
    sizes: Counts,
    workers: Counts,
    #[serde(default)]
    executor: Option<String>,
    #[serde(default)]
    split: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
}

fn load_config(path: &std::path::Path) -> Result<SweepConfig, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    Ok(serde_yaml::from_slice(&bytes)?)
}

#[derive(Debug, PartialEq)]
struct Step {
    name: String,
    args: Vec<String>,
}

fn plan_steps(cfg: &SweepConfig, programs: &[String]) -> Vec<Step> {
    let mut steps = Vec::new();

    for entry in &cfg.runs {
        if !programs.is_empty() && !programs.iter().any(|p| p == &entry.program) {
            continue;
        }

        for size in entry.sizes.flatten() {
            for workers in entry.workers.flatten() {
                let mut args = vec!["run".to_string()];
                if cfg.release {
                    args.push("--release".into());
                }
                args.extend(["--quiet", "-p", entry.program.as_str(), "--"].map(String::from));
                args.extend(["--size".into(), size.to_string()]);
                args.extend(["--workers".into(), workers.to_string()]);
                for (flag, value) in [
                    ("--executor", &entry.executor),
                    ("--split", &entry.split),
                    ("--format", &entry.format),
                ] {
                    if let Some(v) = value {
                        args.extend([flag.to_string(), v.clone()]);
                    }
                }
                if let Some(seed) = entry.seed {
                    args.extend(["--seed".into(), seed.to_string()]);
                }

                steps.push(Step {
                    name: format!("{} size={size} workers={workers}", entry.program),
                    args,
                });
            }
        }
    }
    steps
}

/// Options shared by every step. The machine label reaches the benchmark
/// programs through `PARBENCH_HOST`.
fn step_options(
    workspace: std::path::PathBuf,
    host: Option<&str>,
) -> Result<ShOptions, Box<dyn std::error::Error>> {
    let env = host
        .map(|h| vec![("PARBENCH_HOST".to_string(), h.to_string())])
        .unwrap_or_default();
    Ok(ShOptionsBuilder::default()
        .stdout(StreamMode::Inherit)
        .stderr(StreamMode::Inherit)
        .cwd(Some(workspace))
        .env(env)
        .build()?)
}

pub fn run(args: SweepArgs) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = crate::findup::workspace_root()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| workspace.join("sweep.yaml"));
    let cfg = load_config(&config_path)?;
    log::debug!("loaded {} sweep entries from {}", cfg.runs.len(), config_path.display());

    let steps = plan_steps(&cfg, &args.programs);
    if steps.is_empty() {
        return Err("no sweep runs selected".into());
    }

    let host = args.host.as_deref().or(cfg.host.as_deref());
    let opts = step_options(workspace, host)?;
    let env_prefix: String = opts.env.iter().map(|(k, v)| format!("{k}={v:?} ")).collect();

    for (i, step) in steps.iter().enumerate() {
        println!("[{}/{}] {}", i + 1, steps.len(), step.name);
        if args.verbose || args.dry_run {
            println!("{}cargo {}", env_prefix, step.args.join(" "));
        }
        if args.dry_run {
            continue;
        }
        crate::sh!(options(opts.clone()), "cargo", &step.args)?;
    }

    println!("[sweep] done");
    Ok(())
}
