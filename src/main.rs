//! # Main — CLI Entry Point
//!
//! Resolves the four search settings (TOML file plus command-line
//! overrides), initializes logging, and drives one search run. Product
//! output (timestamps, discoveries, the aggregate report, elapsed time)
//! goes to stdout; diagnostics go to stderr via `tracing`.
//!
//! A configuration error prints a single diagnostic line to stderr and
//! exits with a non-zero status before any search work begins.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use primesweep::config::{self, DivisionMode, Overrides, PrintMode};
use primesweep::search;
use primesweep::sink::ResultSink;

#[derive(Parser)]
#[command(
    name = "primesweep",
    about = "Search for primes concurrently under configurable partitioning and reporting"
)]
struct Cli {
    /// Path to the search configuration TOML
    #[arg(long, default_value = "primesweep.toml", env = "PRIMESWEEP_CONFIG")]
    config: PathBuf,

    /// Override: how results are reported
    #[arg(long, value_enum)]
    print_mode: Option<PrintMode>,

    /// Override: how the search space is divided across workers
    #[arg(long, value_enum)]
    division_mode: Option<DivisionMode>,

    /// Override: number of worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Override: inclusive upper bound of the search range
    #[arg(long)]
    limit: Option<u32>,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    // Structured logging: LOG_FORMAT=json for machine consumers,
    // human-readable stderr otherwise.
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let overrides = Overrides {
        print_mode: cli.print_mode,
        division_mode: cli.division_mode,
        worker_count: cli.workers,
        search_limit: cli.limit,
    };

    let config = match config::resolve(&cli.config, overrides) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    let sink = Arc::new(ResultSink::stdout(config.print_mode));
    match search::run(&config, &sink) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
