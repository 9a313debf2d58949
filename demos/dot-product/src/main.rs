//! Sequential vs parallel dot product benchmark.
//!
//! Generates two seeded vectors, computes their dot product on one thread
//! and on `--workers` threads, prints both timings with the speedup, and
//! appends a record to the results log.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use inputs::{clock_seed, InputGen, DEFAULT_VECTOR_LEN, VECTOR_BOUND};
use parbench::report::file_sink;
use parbench::{compare_dot, Executor, LogFormat, PlanBuilder, ReportSink, Split};

#[derive(Parser, Debug)]
#[command(name = "dot-product", version, about = "Sequential vs parallel dot product")]
struct Args {
    /// Vector length
    #[arg(long, env = "PARBENCH_SIZE", default_value_t = DEFAULT_VECTOR_LEN)]
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
    #[arg(long, env = "PARBENCH_LOG", default_value = "dot_product_results.txt")]
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

    /// Where the remainder goes: last|balanced
    #[arg(long, default_value = "last")]
    split: Split,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let workers = args.workers.unwrap_or_else(parbench::available_workers);
    let seed = args.seed.unwrap_or_else(clock_seed);
    log::info!(
        "[dot-product] size={} workers={} seed={} executor={:?}",
        args.size,
        workers,
        seed,
        args.executor
    );

    println!("Generating vectors of length {}...", args.size);
    let mut gen = InputGen::new(seed);
    let a = gen.vector(args.size, VECTOR_BOUND)?;
    let b = gen.vector(args.size, VECTOR_BOUND)?;

    let plan = PlanBuilder::default()
        .workers(workers)
        .executor(args.executor)
        .split(args.split)
        .build()?;

    println!(">>> Running sequential and parallel ({} workers)...", workers);
    let cmp = compare_dot(&a, &b, &plan).context("dot product benchmark failed")?;

    println!();
    println!("=== Results ===");
    println!("Sequential result: {}", cmp.sequential.value);
    println!("Parallel result:   {}", cmp.parallel.value);
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
        match sink.record(&cmp.record("dot-product", &args.host)) {
            Ok(()) => println!("Result appended to '{}'", args.log_file.display()),
            Err(e) => log::error!("could not write {}: {}", args.log_file.display(), e),
        }
    }

    if let Err(e) = cmp.verify() {
        log::error!("[dot-product] {}", e);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
