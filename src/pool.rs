//! # Worker Pool — Fixed-Size Reusable Thread Pool
//!
//! A hand-built shared-queue pool: one `Mutex` around the FIFO job
//! queue and the shutdown flag, one `Condvar` for idle workers. Workers
//! are long-lived named threads; each loops {wait for work, dequeue one
//! job, run it}. Submission is non-blocking and returns a completion
//! handle backed by a per-job channel.
//!
//! ## Contract
//!
//! - FIFO dequeue order; no guarantee which worker runs which job.
//! - A panicking job resolves its handle with an error and the worker
//!   moves on to the next job — one bad task never kills the pool.
//! - `shutdown` wakes every worker and joins them; workers drain the
//!   queue before exiting, so work submitted before shutdown always
//!   runs. Callers are expected to await all handles before shutting
//!   down.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    queue: VecDeque<Job>,
    shutdown: bool,
}

/// A job submitted to the pool panicked (or was lost before running).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPanicked;

impl fmt::Display for TaskPanicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker task panicked before completing")
    }
}

impl std::error::Error for TaskPanicked {}

/// Completion handle for one submitted job.
///
/// Dropping the handle without waiting leaks only the result; the job
/// itself still runs.
pub struct JobHandle<T> {
    rx: Receiver<thread::Result<T>>,
}

impl<T> JobHandle<T> {
    /// Block until the job finishes and take its result.
    pub fn wait(self) -> Result<T, TaskPanicked> {
        match self.rx.recv() {
            Ok(Ok(value)) => Ok(value),
            _ => Err(TaskPanicked),
        }
    }
}

pub struct WorkerPool {
    shared: Arc<(Mutex<PoolState>, Condvar)>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` long-lived workers. `size` must be positive.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "worker pool size must be positive");
        let shared = Arc::new((
            Mutex::new(PoolState {
                queue: VecDeque::new(),
                shutdown: false,
            }),
            Condvar::new(),
        ));
        let workers = (0..size)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("primesweep-worker-{}", i))
                    .spawn(move || worker_loop(&shared))
                    .expect("spawn pool worker thread")
            })
            .collect();
        debug!(size, "worker pool started");
        WorkerPool { shared, workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue one job and wake a waiting worker. Non-blocking; the
    /// returned handle resolves when the job has run.
    pub fn submit<T, F>(&self, job: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let wrapped: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(job));
            // Receiver may have been dropped; the job's effect stands either way.
            let _ = tx.send(result);
        });
        let (lock, cvar) = &*self.shared;
        let mut state = lock.lock().unwrap();
        debug_assert!(!state.shutdown, "submit after shutdown");
        state.queue.push_back(wrapped);
        drop(state);
        cvar.notify_one();
        JobHandle { rx }
    }

    /// Signal shutdown, wake every worker, and join them all. Workers
    /// finish the queued jobs first. Safe to call more than once; the
    /// second call is a no-op.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        {
            let (lock, cvar) = &*self.shared;
            lock.lock().unwrap().shutdown = true;
            cvar.notify_all();
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        debug!("worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &(Mutex<PoolState>, Condvar)) {
    let (lock, cvar) = shared;
    loop {
        let job = {
            let mut state = lock.lock().unwrap();
            loop {
                if let Some(job) = state.queue.pop_front() {
                    break job;
                }
                if state.shutdown {
                    return;
                }
                state = cvar.wait(state).unwrap();
            }
        };
        // Lock released before running: jobs never serialize on the queue mutex.
        job();
    }
}
