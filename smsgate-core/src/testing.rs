// ABOUTME: Test doubles for the backend contract: an in-memory log sink, a recording router, a stub backend.
// ABOUTME: Used by this workspace's tests and by anyone writing a new transport backend.

use crate::error::BackendError;
use crate::log::{LogEntry, LogSink, Severity};
use crate::message::{IncomingMessage, OutgoingMessage};
use crate::traits::{Backend, BackendState, Router, SendOutcome};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Log sink that keeps every batch in memory
#[derive(Clone, Default)]
pub struct MemorySink {
    batches: Arc<Mutex<Vec<Vec<LogEntry>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches in write order
    pub fn batches(&self) -> Vec<Vec<LogEntry>> {
        lock(&self.batches).clone()
    }

    /// All entries, flattened in write order
    pub fn entries(&self) -> Vec<LogEntry> {
        lock(&self.batches).iter().flatten().cloned().collect()
    }

    /// Entries with the given severity
    pub fn with_severity(&self, severity: Severity) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.severity == severity)
            .collect()
    }

    /// Every line written, in order, regardless of severity
    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .flat_map(|e| e.lines)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn write(&self, entries: &[LogEntry]) {
        lock(&self.batches).push(entries.to_vec());
    }
}

/// Router that records every message it is handed
#[derive(Clone, Default)]
pub struct RecordingRouter {
    received: Arc<Mutex<Vec<IncomingMessage>>>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<IncomingMessage> {
        lock(&self.received).clone()
    }
}

impl Router for RecordingRouter {
    fn incoming(&self, message: IncomingMessage) {
        lock(&self.received).push(message);
    }
}

/// Backend with canned behavior, for exercising code that drives backends
pub struct StubBackend {
    id: String,
    state: Mutex<BackendState>,
    start_error: Option<BackendError>,
    outcome: SendOutcome,
    sent: Mutex<Vec<OutgoingMessage>>,
    sink: MemorySink,
}

impl StubBackend {
    /// A backend that starts cleanly and accepts every message
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(BackendState::Unstarted),
            start_error: None,
            outcome: SendOutcome::Sent,
            sent: Mutex::new(Vec::new()),
            sink: MemorySink::new(),
        }
    }

    pub fn failing_start(mut self, error: BackendError) -> Self {
        self.start_error = Some(error);
        self
    }

    pub fn rejecting_sends(mut self) -> Self {
        self.outcome = SendOutcome::Failed;
        self
    }

    /// Messages passed to `send`, in call order
    pub fn sent(&self) -> Vec<OutgoingMessage> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl Backend for StubBackend {
    fn kind(&self) -> &'static str {
        "stub"
    }

    fn backend_id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> BackendState {
        *lock(&self.state)
    }

    fn log_sink(&self) -> &dyn LogSink {
        &self.sink
    }

    async fn start(&self) -> Result<(), BackendError> {
        let mut state = lock(&self.state);
        if *state != BackendState::Unstarted {
            return Err(BackendError::AlreadyStarted {
                backend: self.id.clone(),
                state: *state,
            });
        }
        match &self.start_error {
            Some(err) => {
                *state = BackendState::Failed;
                Err(err.clone())
            }
            None => {
                *state = BackendState::Ready;
                Ok(())
            }
        }
    }

    async fn send(&self, message: &OutgoingMessage) -> Result<SendOutcome, BackendError> {
        self.check_outgoing(message)?;
        let state = self.state();
        if state != BackendState::Ready {
            return Err(BackendError::NotReady {
                backend: self.id.clone(),
                state,
            });
        }
        lock(&self.sent).push(message.clone());
        if self.outcome == SendOutcome::Failed {
            self.log(Severity::Warn, &["Message sending FAILED"]);
        }
        Ok(self.outcome)
    }
}
