//! # Static Range Partitioning
//!
//! The simplest strategy: split `[1, limit]` into `worker_count`
//! contiguous chunks up front, spawn one thread per chunk, join them
//! all. Chunks are `limit / worker_count` long except the final chunk,
//! which absorbs the remainder up to `limit` — a documented asymmetry,
//! within tolerance for this partitioning scheme.
//!
//! Each worker scans its chunk serially with the primality oracle and
//! reports every hit straight into the shared sink; its chunk index is
//! its worker id. No pool is involved — for a fixed, small, known
//! count of units, directly-joined threads are the simplest correct
//! model.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::thread;
use tracing::debug;

use crate::primality;
use crate::sink::ResultSink;

/// Split `[1, limit]` into `worker_count` contiguous inclusive chunks.
///
/// Requires `1 <= worker_count <= limit` (guaranteed by config
/// validation), so every chunk is non-empty. The union of the chunks is
/// exactly `[1, limit]` with no gap and no overlap.
pub fn chunk_ranges(limit: u32, worker_count: usize) -> Vec<(u32, u32)> {
    let chunk = limit / worker_count as u32;
    (0..worker_count)
        .map(|i| {
            let start = i as u32 * chunk + 1;
            let end = if i == worker_count - 1 {
                limit
            } else {
                start + chunk - 1
            };
            (start, end)
        })
        .collect()
}

/// Run the static-range search: one directly-joined thread per chunk.
/// Complete exactly when every thread has returned.
pub fn run(limit: u32, worker_count: usize, sink: &Arc<ResultSink>) -> Result<()> {
    let handles: Vec<_> = chunk_ranges(limit, worker_count)
        .into_iter()
        .enumerate()
        .map(|(worker, (start, end))| {
            let sink = Arc::clone(sink);
            debug!(worker, start, end, "spawning range worker");
            thread::spawn(move || {
                for n in start..=end {
                    if primality::is_prime(n) {
                        sink.report(n, worker);
                    }
                }
            })
        })
        .collect();
    for (worker, handle) in handles.into_iter().enumerate() {
        handle
            .join()
            .map_err(|_| anyhow!("range worker {} panicked", worker))?;
    }
    Ok(())
}
