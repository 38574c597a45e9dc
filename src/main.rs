use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use vector_state::bench::{self, BenchParams, Strategy};
use vector_state::config::StoreConfig;
use vector_state::logger::init_tracing;

#[derive(Debug, Parser)]
#[command(
    name = "vector-bench",
    version,
    about = "Measure reducer and read-action throughput of a Vector state store"
)]
struct Cli {
    /// Number of increment reducers to enqueue
    #[arg(long, default_value_t = 10_000)]
    jobs: u64,

    /// Number of concurrent producers sharing the reducers
    #[arg(long, default_value_t = 2)]
    producers: u64,

    /// Number of read-actions enqueued alongside the reducers
    #[arg(long, default_value_t = 100)]
    reads: u64,

    /// Synchronization design to measure
    #[arg(long, value_enum, default_value_t = Strategy::Store)]
    strategy: Strategy,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Store config file (defaults to the user config, if any)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Runtime worker threads
    #[arg(long, default_value_t = 4)]
    worker_threads: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => StoreConfig::load_from(path)?,
        None => StoreConfig::load()?,
    };
    let params = BenchParams {
        jobs: cli.jobs,
        producers: cli.producers,
        reads: cli.reads,
    };
    params.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cli.worker_threads.max(1))
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    let report = runtime.block_on(bench::run(cli.strategy, &params, &config))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
