mod findup;
mod sh;
mod sweep;

use clap::{Parser, Subcommand};

/// xtask command-line interface
#[derive(Parser)]
#[command(name = "xtask", version, about = "parbench auxiliary tasks")]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Command,
}

/// Supported subcommands
#[derive(Subcommand)]
enum Command {
    /// Run the benchmark programs over a grid of sizes and worker counts
    Sweep(sweep::SweepArgs),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Sweep(args) => {
            if let Err(e) = sweep::run(args) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
