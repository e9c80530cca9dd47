//! # Dynamic Elimination — Sieve-Style Partitioning
//!
//! The adaptive strategy: a coordinator scans divisor candidates in
//! ascending order over a shared sieve, and every confirmed divisor
//! spawns an elimination task on the worker pool that marks its
//! multiples composite.
//!
//! ## Shared Sieve, No Locks
//!
//! [`SieveState`] is one `AtomicBool` per index, written with Relaxed
//! stores of `false` only. Writes are idempotent monotone true→false
//! transitions, so overlapping eliminations from different workers can
//! never corrupt a cell. What DOES need discipline is reading: the
//! coordinator must not read a cell that an unresolved task could still
//! write. That discipline is the batch barrier below — deliberately not
//! per-cell locking, which would be correct but would hide the
//! lock-free design being demonstrated.
//!
//! ## Batch Barrier
//!
//! At most `worker_count` elimination tasks are in flight. The
//! coordinator awaits the whole batch when it fills, and additionally
//! awaits the batch before testing any candidate an in-flight divisor
//! divides — so a composite is never misclassified prime because its
//! eliminating task has not run yet.
//!
//! ## Start Point and Boundary
//!
//! Immediate reporting needs every prime visited in ascending order, so
//! the scan runs to `limit` and each task starts at the divisor itself
//! (retiring it after it was reported — the sieve is not a prime map
//! afterwards and is never read as one). Aggregate reporting only needs
//! the final sieve, so the scan stops at `⌊√limit⌋` and each task
//! starts at `divisor²`: smaller multiples were already eliminated by
//! smaller divisors.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::config::PrintMode;
use crate::pool::{JobHandle, WorkerPool};
use crate::sink::ResultSink;

/// Immediate lines from the divisor scan carry the coordinator's id.
const COORDINATOR: usize = 0;

/// Shared elimination sieve over `[0, limit]`, seeded candidate
/// (`true`) everywhere except indices below 2.
pub struct SieveState {
    cells: Vec<AtomicBool>,
}

impl SieveState {
    pub fn new(limit: u32) -> Self {
        let cells = (0..=limit as usize)
            .map(|i| AtomicBool::new(i >= 2))
            .collect();
        SieveState { cells }
    }

    pub fn limit(&self) -> u32 {
        (self.cells.len() - 1) as u32
    }

    /// Is `n` still unmarked? Only meaningful once every task that
    /// could eliminate `n` has been awaited.
    pub fn is_candidate(&self, n: u32) -> bool {
        self.cells[n as usize].load(Ordering::Relaxed)
    }

    /// Mark `from, from + divisor, from + 2·divisor, …` composite, up
    /// to the sieve limit. Relaxed false-stores only; idempotent, safe
    /// to overlap with any other elimination.
    pub fn eliminate_multiples(&self, divisor: u32, from: u32) {
        let limit = u64::from(self.limit());
        let mut multiple = u64::from(from);
        while multiple <= limit {
            self.cells[multiple as usize].store(false, Ordering::Relaxed);
            multiple += u64::from(divisor);
        }
    }

    /// Every surviving index `>= 2`, ascending.
    pub fn surviving(&self) -> Vec<u32> {
        (2..=self.limit()).filter(|&n| self.is_candidate(n)).collect()
    }
}

/// Largest `r` with `r² <= n`.
fn isqrt(n: u32) -> u32 {
    let mut r = (f64::from(n)).sqrt() as u32;
    while u64::from(r + 1) * u64::from(r + 1) <= u64::from(n) {
        r += 1;
    }
    while u64::from(r) * u64::from(r) > u64::from(n) {
        r -= 1;
    }
    r
}

/// Run the dynamic-elimination search over `sieve`, submitting
/// elimination tasks to `pool` in batches of at most `worker_count`.
///
/// In Aggregate mode this also records the surviving sieve into the
/// sink (the caller triggers the final report).
pub fn run(
    worker_count: usize,
    pool: &WorkerPool,
    sieve: &Arc<SieveState>,
    sink: &Arc<ResultSink>,
) -> Result<()> {
    let limit = sieve.limit();
    let ascending = sink.mode() == PrintMode::Immediate;
    let boundary = if ascending { limit } else { isqrt(limit) };
    debug!(limit, boundary, ascending, "divisor scan starting");

    let mut in_flight: Vec<(u32, JobHandle<()>)> = Vec::with_capacity(worker_count);

    for divisor in 2..=boundary {
        // Never read a cell an unresolved task could write: if any
        // in-flight divisor divides this candidate, its elimination
        // must land first.
        if in_flight.iter().any(|&(p, _)| divisor % p == 0) {
            await_batch(&mut in_flight)?;
        }
        if !sieve.is_candidate(divisor) {
            continue;
        }
        if ascending {
            sink.report(divisor, COORDINATOR);
        }
        let from = if ascending { divisor } else { divisor * divisor };
        let task_sieve = Arc::clone(sieve);
        in_flight.push((
            divisor,
            pool.submit(move || task_sieve.eliminate_multiples(divisor, from)),
        ));
        if in_flight.len() >= worker_count {
            await_batch(&mut in_flight)?;
        }
    }
    await_batch(&mut in_flight)?;

    if !ascending {
        for prime in sieve.surviving() {
            sink.record(prime);
        }
    }
    Ok(())
}

/// The batch barrier: resolve every in-flight handle, surfacing task
/// panics — a silently dropped elimination would corrupt the result
/// set.
fn await_batch(in_flight: &mut Vec<(u32, JobHandle<()>)>) -> Result<()> {
    for (divisor, handle) in in_flight.drain(..) {
        handle
            .wait()
            .with_context(|| format!("elimination task for divisor {} failed", divisor))?;
    }
    Ok(())
}
