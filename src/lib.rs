//! # primesweep — Concurrent Prime Search Engine
//!
//! Computes every prime in `[2, limit]` with a pool of concurrent
//! workers, under a choice of two partitioning strategies and two
//! reporting modes:
//!
//! - **static-range**: each worker scans one fixed contiguous chunk of
//!   the search space on its own directly-joined thread.
//! - **dynamic-elimination**: workers on a reusable [`pool::WorkerPool`]
//!   mark multiples of discovered divisors in a shared lock-free sieve,
//!   synchronized by an explicit batch barrier.
//! - **immediate**: every discovery is printed the instant it is found.
//! - **aggregate**: discoveries are buffered and reported once at the
//!   end.
//!
//! The four settings come from a TOML file with command-line overrides
//! (see [`config`]); [`search::run`] drives one complete run.

pub mod config;
pub mod elimination;
pub mod pool;
pub mod primality;
pub mod range_split;
pub mod search;
pub mod sink;
