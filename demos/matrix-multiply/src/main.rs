//! Sequential vs row-block parallel matrix multiplication benchmark.
//!
//! Each worker computes a contiguous block of rows of C = A * B; the last
//! worker also takes the rows left over when the dimension does not divide
//! evenly.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use inputs::{clock_seed, InputGen, DEFAULT_MATRIX_DIM, MATRIX_BOUND};
use parbench::report::file_sink;
use parbench::{compare_matmul, Executor, LogFormat, Matrix, PlanBuilder, ReportSink, Split};

#[derive(Parser, Debug)]
#[command(
    name = "matrix-multiply",
    version,
    about = "Sequential vs row-block parallel matrix multiplication"
)]
struct Args {
    /// Matrix dimension N (matrices are N x N)
    #[arg(long, env = "PARBENCH_SIZE", default_value_t = DEFAULT_MATRIX_DIM)]
    size: usize,

    /// Number of parallel workers (defaults to the available parallelism)
    #[arg(short, long, env = "PARBENCH_WORKERS")]
    workers: Option<usize>,

    /// Seed for input generation (defaults to the clock)
    #[arg(long, env = "PARBENCH_SEED")]
    seed: Option<u64>,

    /// Machine label written to the results log
    #[arg(long, env = "PARBENCH_HOST", default_value = "unknown")]
    host: String,

    /// Results log, appended to on every run
    #[arg(long, env = "PARBENCH_LOG", default_value = "matrix_results.txt")]
    log_file: PathBuf,

    /// Results log format: text|json
    #[arg(long, default_value = "text")]
    format: LogFormat,

    /// Do not append to the results log
    #[arg(long)]
    no_log: bool,

    /// How workers are launched: threads|rayon
    #[arg(long, default_value = "threads")]
    executor: Executor,

    /// Where the leftover rows go: last|balanced
    #[arg(long, default_value = "last")]
    split: Split,
}

fn head(m: &Matrix) -> String {
    if m.dim() == 0 {
        return "[]".to_string();
    }
    let cells: Vec<String> = m.row(0).iter().take(4).map(i64::to_string).collect();
    format!("[{}]", cells.join(", "))
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let workers = args.workers.unwrap_or_else(parbench::available_workers);
    let seed = args.seed.unwrap_or_else(clock_seed);
    log::info!(
        "[matrix-multiply] size={}x{} workers={} seed={} executor={:?}",
        args.size,
        args.size,
        workers,
        seed,
        args.executor
    );

    println!("Generating {}x{} matrices...", args.size, args.size);
    let mut gen = InputGen::new(seed);
    let a = gen.matrix(args.size, MATRIX_BOUND)?;
    let b = gen.matrix(args.size, MATRIX_BOUND)?;
    println!("Matrix A[0][..4]: {}", head(&a));
    println!("Matrix B[0][..4]: {}", head(&b));

    let plan = PlanBuilder::default()
        .workers(workers)
        .executor(args.executor)
        .split(args.split)
        .build()?;

    println!(">>> Running sequential and parallel ({} workers)...", workers);
    let cmp = compare_matmul(&a, &b, &plan).context("matrix benchmark failed")?;

    println!();
    println!("=== Results ===");
    println!("Result C[0][..4]: {}", head(&cmp.parallel.value));
    println!("Result checksum:   {}", cmp.parallel.value.checksum());
    println!("Sequential time:   {:.4} s", cmp.sequential.seconds());
    println!("Parallel time:     {:.4} s", cmp.parallel.seconds());
    println!("Speedup (Sp):      {:.2} x", cmp.speedup());

    if cmp.verdict().is_match() {
        println!("Verification: PASSED (sequential == parallel)");
    } else {
        println!("Verification: FAILED (mismatch!)");
    }

    if !args.no_log {
        let mut sink = file_sink(args.format, &args.log_file);
        match sink.record(&cmp.record("matrix-multiply", &args.host)) {
            Ok(()) => println!("Result appended to '{}'", args.log_file.display()),
            Err(e) => log::error!("could not write {}: {}", args.log_file.display(), e),
        }
    }

    if let Err(e) = cmp.verify() {
        log::error!("[matrix-multiply] {}", e);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
