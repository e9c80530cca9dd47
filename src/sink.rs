//! # Result Sink — Synchronized Discovery Collector
//!
//! The single object every worker reports into. One mutex guards both
//! the output writer and the aggregate buffer, so every emitted line is
//! atomic — concurrent reporters can interleave lines but never bytes
//! within a line.
//!
//! Two reporting modes, selected at construction:
//!
//! - **Immediate**: each discovery is written the instant it is found,
//!   as `Thread [<id>]: Found prime <n> at <timestamp>`. Line order is
//!   whichever thread takes the lock first.
//! - **Aggregate**: discoveries are buffered and flushed once by
//!   [`ResultSink::drain_and_report`], in recording order (which is
//!   scheduling order, not numeric order).
//!
//! The writer is injected so the binary hands in stdout while tests
//! hand in a shared buffer.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Local;

use crate::config::PrintMode;

/// Wall-clock timestamp with millisecond precision, local time.
pub fn timestamp_now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

struct SinkInner {
    out: Box<dyn Write + Send>,
    recorded: Vec<u32>,
    found: u64,
}

pub struct ResultSink {
    mode: PrintMode,
    inner: Mutex<SinkInner>,
}

impl ResultSink {
    /// Sink writing to the process stdout.
    pub fn stdout(mode: PrintMode) -> Self {
        Self::with_writer(mode, Box::new(io::stdout()))
    }

    /// Sink writing to an arbitrary writer (tests pass a shared buffer).
    pub fn with_writer(mode: PrintMode, out: Box<dyn Write + Send>) -> Self {
        ResultSink {
            mode,
            inner: Mutex::new(SinkInner {
                out,
                recorded: Vec::new(),
                found: 0,
            }),
        }
    }

    pub fn mode(&self) -> PrintMode {
        self.mode
    }

    /// Report one discovered prime, dispatching on the sink's mode.
    pub fn report(&self, value: u32, worker: usize) {
        match self.mode {
            PrintMode::Immediate => self.report_immediate(value, worker),
            PrintMode::Aggregate => self.record(value),
        }
    }

    /// Emit one `Thread [<id>]: Found prime <n> at <ts>` line under the
    /// sink lock. The timestamp is taken while the lock is held so line
    /// order and timestamp order agree.
    pub fn report_immediate(&self, value: u32, worker: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.found += 1;
        let line = format!(
            "Thread [{}]: Found prime {} at {}",
            worker,
            value,
            timestamp_now()
        );
        let _ = writeln!(inner.out, "{}", line);
    }

    /// Append one value to the aggregate buffer.
    pub fn record(&self, value: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.found += 1;
        inner.recorded.push(value);
    }

    /// Flush the aggregate buffer as a single report block: a header
    /// line, then every recorded value space-separated on one line.
    pub fn drain_and_report(&self) {
        let mut inner = self.inner.lock().unwrap();
        let values = inner
            .recorded
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(inner.out, "All primes found:");
        let _ = writeln!(inner.out, "{}", values);
        let _ = inner.out.flush();
    }

    /// Write one arbitrary line through the sink lock. Used by the
    /// orchestrator for the start/end/elapsed lines so all product
    /// output serializes through the same mutex.
    pub fn write_line(&self, line: &str) {
        let mut inner = self.inner.lock().unwrap();
        let _ = writeln!(inner.out, "{}", line);
        let _ = inner.out.flush();
    }

    /// Snapshot of the aggregate buffer, in recording order.
    pub fn recorded(&self) -> Vec<u32> {
        self.inner.lock().unwrap().recorded.clone()
    }

    /// Total discoveries reported through this sink, in either mode.
    pub fn found_count(&self) -> u64 {
        self.inner.lock().unwrap().found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    /// Cloneable writer the tests can read back after the sink is done.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
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

    #[test]
    fn immediate_line_format() {
        let buf = SharedBuf::default();
        let sink = ResultSink::with_writer(PrintMode::Immediate, Box::new(buf.clone()));
        sink.report(7, 3);
        let out = buf.contents();
        assert!(
            out.starts_with("Thread [3]: Found prime 7 at "),
            "unexpected line: {}",
            out
        );
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn aggregate_mode_buffers_instead_of_emitting() {
        let buf = SharedBuf::default();
        let sink = ResultSink::with_writer(PrintMode::Aggregate, Box::new(buf.clone()));
        sink.report(2, 0);
        sink.report(5, 1);
        assert!(buf.contents().is_empty(), "aggregate must not emit per result");
        assert_eq!(sink.recorded(), vec![2, 5]);
    }

    #[test]
    fn drain_reports_in_recording_order() {
        let buf = SharedBuf::default();
        let sink = ResultSink::with_writer(PrintMode::Aggregate, Box::new(buf.clone()));
        for v in [11, 2, 7] {
            sink.record(v);
        }
        sink.drain_and_report();
        let out = buf.contents();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("All primes found:"));
        assert_eq!(lines.next(), Some("11 2 7"));
    }

    #[test]
    fn drain_with_no_results_still_prints_header() {
        let buf = SharedBuf::default();
        let sink = ResultSink::with_writer(PrintMode::Aggregate, Box::new(buf.clone()));
        sink.drain_and_report();
        assert!(buf.contents().starts_with("All primes found:"));
    }

    #[test]
    fn found_count_tracks_both_modes() {
        let buf = SharedBuf::default();
        let sink = ResultSink::with_writer(PrintMode::Immediate, Box::new(buf));
        sink.report(2, 0);
        sink.report(3, 1);
        assert_eq!(sink.found_count(), 2);

        let sink = ResultSink::with_writer(PrintMode::Aggregate, Box::new(SharedBuf::default()));
        sink.report(2, 0);
        assert_eq!(sink.found_count(), 1);
    }

    /// 8 threads hammer the immediate path. Every resulting line must be
    /// complete — the lock makes lines atomic even though their order is
    /// scheduling-dependent.
    #[test]
    fn concurrent_immediate_lines_never_interleave() {
        let buf = SharedBuf::default();
        let sink = Arc::new(ResultSink::with_writer(
            PrintMode::Immediate,
            Box::new(buf.clone()),
        ));
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..50 {
                        sink.report_immediate(100 * worker as u32 + i, worker);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let out = buf.contents();
        assert_eq!(out.lines().count(), 400);
        for line in out.lines() {
            assert!(
                line.starts_with("Thread [") && line.contains("]: Found prime "),
                "mangled line: {}",
                line
            );
        }
        assert_eq!(sink.found_count(), 400);
    }

    /// Concurrent record() calls must lose nothing.
    #[test]
    fn concurrent_records_all_arrive() {
        let sink = Arc::new(ResultSink::with_writer(
            PrintMode::Aggregate,
            Box::new(SharedBuf::default()),
        ));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..250 {
                        sink.record(1000 * t + i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sink.recorded().len(), 1000);
    }
}
