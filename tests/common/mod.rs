//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use primesweep::config::PrintMode;
use primesweep::sink::ResultSink;

/// Cloneable in-memory writer: hand one clone to a sink, keep the
/// other to read the output back after the run.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("sink output is UTF-8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that discards all console output (aggregate assertions go
/// through `recorded()` instead).
pub fn silent_sink(mode: PrintMode) -> Arc<ResultSink> {
    Arc::new(ResultSink::with_writer(mode, Box::new(io::sink())))
}

/// Sink writing into a buffer, plus the buffer to inspect.
pub fn buffered_sink(mode: PrintMode) -> (Arc<ResultSink>, SharedBuf) {
    let buf = SharedBuf::default();
    let sink = Arc::new(ResultSink::with_writer(mode, Box::new(buf.clone())));
    (sink, buf)
}

/// Parse the value out of every `Thread [..]: Found prime N at ..` line.
pub fn reported_primes(output: &str) -> Vec<u32> {
    output
        .lines()
        .filter(|line| line.contains("Found prime "))
        .map(|line| {
            line.split("Found prime ")
                .nth(1)
                .and_then(|rest| rest.split(' ').next())
                .and_then(|n| n.parse().ok())
                .unwrap_or_else(|| panic!("unparseable discovery line: {}", line))
        })
        .collect()
}
