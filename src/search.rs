//! # Search Orchestration
//!
//! Top-level driver for one run: capture timing, dispatch the selected
//! partitioning strategy, wait for every worker, trigger the final
//! report, and emit the elapsed time. The run moves through a fixed
//! phase sequence — `Idle → Running → Draining → Reported → Done` —
//! with no retry path: any failure aborts the run.

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::{DivisionMode, PrintMode, SearchConfig};
use crate::elimination::{self, SieveState};
use crate::pool::WorkerPool;
use crate::range_split;
use crate::sink::{timestamp_now, ResultSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Draining,
    Reported,
    Done,
}

fn advance(phase: &mut Phase, next: Phase) {
    debug!(from = ?*phase, to = ?next, "search phase");
    *phase = next;
}

/// What a completed run produced, for callers that want more than the
/// console output.
#[derive(Debug, Clone, Copy)]
pub struct SearchOutcome {
    pub primes_found: u64,
    pub elapsed: Duration,
}

/// Execute one search run against the given sink.
pub fn run(config: &SearchConfig, sink: &Arc<ResultSink>) -> Result<SearchOutcome> {
    let mut phase = Phase::Idle;
    let started = Instant::now();
    sink.write_line(&format!("Search started at: {}", timestamp_now()));
    advance(&mut phase, Phase::Running);

    let mut pool = None;
    match config.division_mode {
        DivisionMode::StaticRange => {
            range_split::run(config.search_limit, config.worker_count, sink)?;
        }
        DivisionMode::DynamicElimination => {
            let sieve = Arc::new(SieveState::new(config.search_limit));
            let workers = WorkerPool::new(config.worker_count);
            elimination::run(config.worker_count, &workers, &sieve, sink)?;
            pool = Some(workers);
        }
    }

    // All threads joined / all handles awaited inside the partitioner.
    advance(&mut phase, Phase::Draining);

    advance(&mut phase, Phase::Reported);
    if config.print_mode == PrintMode::Aggregate {
        sink.drain_and_report();
    }

    advance(&mut phase, Phase::Done);
    if let Some(mut workers) = pool.take() {
        workers.shutdown();
    }
    let elapsed = started.elapsed();
    sink.write_line(&format!("Search ended at: {}", timestamp_now()));
    sink.write_line(&format!("Total execution time: {} ms", elapsed.as_millis()));

    let outcome = SearchOutcome {
        primes_found: sink.found_count(),
        elapsed,
    };
    info!(
        primes = outcome.primes_found,
        elapsed_ms = elapsed.as_millis() as u64,
        print_mode = %config.print_mode,
        division_mode = %config.division_mode,
        workers = config.worker_count,
        limit = config.search_limit,
        "search complete"
    );
    Ok(outcome)
}
