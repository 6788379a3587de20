// ABOUTME: Backend log pass-through: severities, entries, and the sinks they are written to
// ABOUTME: StartupLog batches a backend's start-up lines so they reach the sink contiguously

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Serializes batch writes to the process-wide log output.
///
/// Only the write itself is held under this lock, never backend work.
static FLUSH_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    /// A backend finished starting
    Init,
    Warn,
    Err,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Init => "init",
            Severity::Warn => "warn",
            Severity::Err => "err",
        };
        f.write_str(name)
    }
}

/// One log event: a backend, a severity, and one or more lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub backend: String,
    pub severity: Severity,
    pub lines: Vec<String>,
}

impl LogEntry {
    pub fn new(backend: impl Into<String>, severity: Severity, lines: &[&str]) -> Self {
        Self {
            backend: backend.into(),
            severity,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Destination for backend log entries.
///
/// A single `write` call is a batch; implementations must keep its entries
/// together in their output.
pub trait LogSink: Send + Sync {
    fn write(&self, entries: &[LogEntry]);
}

/// Forwards entries to `tracing`, one event per line
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, entries: &[LogEntry]) {
        let _guard = FLUSH_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for entry in entries {
            for line in &entry.lines {
                match entry.severity {
                    Severity::Info => {
                        tracing::info!(backend = %entry.backend, "{}", line)
                    }
                    Severity::Init => {
                        tracing::info!(backend = %entry.backend, severity = "init", "{}", line)
                    }
                    Severity::Warn => {
                        tracing::warn!(backend = %entry.backend, "{}", line)
                    }
                    Severity::Err => {
                        tracing::error!(backend = %entry.backend, "{}", line)
                    }
                }
            }
        }
    }
}

/// Collects a backend's start-up lines and writes them as one batch.
///
/// The batch is flushed when the log is dropped, so every exit path out of
/// `start` (including `?` returns) emits what was collected.
pub struct StartupLog<'a> {
    backend: String,
    sink: &'a dyn LogSink,
    entries: Vec<LogEntry>,
}

impl<'a> StartupLog<'a> {
    pub fn new(backend: impl Into<String>, sink: &'a dyn LogSink) -> Self {
        Self {
            backend: backend.into(),
            sink,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, severity: Severity, lines: &[&str]) {
        self.entries
            .push(LogEntry::new(self.backend.clone(), severity, lines));
    }

    pub fn info(&mut self, line: &str) {
        self.push(Severity::Info, &[line]);
    }

    pub fn init(&mut self, line: &str) {
        self.push(Severity::Init, &[line]);
    }

    pub fn err(&mut self, lines: &[&str]) {
        self.push(Severity::Err, lines);
    }

    /// Write everything collected so far
    pub fn flush(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let entries = std::mem::take(&mut self.entries);
        self.sink.write(&entries);
    }
}

impl Drop for StartupLog<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySink;

    #[test]
    fn test_startup_log_flushes_on_drop() {
        let sink = MemorySink::new();
        {
            let mut log = StartupLog::new("gsm", &sink);
            log.info("Waiting for GSM network...");
            log.init("Started GSM Backend");
            assert!(sink.entries().is_empty());
        }
        assert_eq!(sink.batches().len(), 1);
        assert_eq!(sink.entries().len(), 2);
        assert_eq!(sink.entries()[1].severity, Severity::Init);
    }

    #[test]
    fn test_startup_log_flushes_on_early_return() {
        fn wait_for_network() -> Result<u8, String> {
            Err("no network".to_string())
        }

        fn failing_start(sink: &dyn LogSink) -> Result<(), String> {
            let mut log = StartupLog::new("gsm", sink);
            log.info("Waiting for GSM network...");
            wait_for_network()?;
            log.init("Started GSM Backend");
            Ok(())
        }

        let sink = MemorySink::new();
        assert!(failing_start(&sink).is_err());
        assert_eq!(sink.entries().len(), 1);
    }

    #[test]
    fn test_empty_startup_log_writes_nothing() {
        let sink = MemorySink::new();
        drop(StartupLog::new("gsm", &sink));
        assert!(sink.batches().is_empty());
    }
}
