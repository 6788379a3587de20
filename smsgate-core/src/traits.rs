// ABOUTME: Core traits for pluggable SMS transports
// ABOUTME: Backend is what every transport implements; Router is where inbound messages go

use crate::error::BackendError;
use crate::log::{LogEntry, LogSink, Severity};
use crate::message::{IncomingMessage, OutgoingMessage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Lifecycle
// =============================================================================

/// Where a backend is in its one-way lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendState {
    /// Constructed, no I/O performed yet
    Unstarted,
    /// `start` is in progress
    Starting,
    /// Session is up and the inbound handler is registered
    Ready,
    /// `start` failed; the backend will not recover on its own
    Failed,
}

impl fmt::Display for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendState::Unstarted => "unstarted",
            BackendState::Starting => "starting",
            BackendState::Ready => "ready",
            BackendState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What happened to an outgoing message
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendOutcome {
    /// The transport accepted the message
    Sent,
    /// The transport declined it; the backend is still usable
    Failed,
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

// =============================================================================
// Backend
// =============================================================================

/// A transport that can send and receive short text messages.
///
/// Construction is backend-specific and must not perform I/O. `start` is
/// called once; `send` is only meaningful after it succeeds. Inbound
/// messages are pushed to the [`Router`] the backend was built with.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Transport family (e.g., "gsm")
    fn kind(&self) -> &'static str;

    /// Instance identifier, used as the origin of inbound messages
    fn backend_id(&self) -> &str;

    /// Current lifecycle state
    fn state(&self) -> BackendState;

    /// Where this backend's log lines go
    fn log_sink(&self) -> &dyn LogSink;

    /// Open the transport and register for inbound messages
    async fn start(&self) -> Result<(), BackendError>;

    /// Hand a message to the transport.
    ///
    /// Implementations call [`Backend::check_outgoing`] first. A transport that
    /// declines the message yields `Ok(SendOutcome::Failed)`, not an error.
    async fn send(&self, message: &OutgoingMessage) -> Result<SendOutcome, BackendError>;

    /// Precondition shared by every backend's `send`
    fn check_outgoing(&self, message: &OutgoingMessage) -> Result<(), BackendError> {
        message.validate()
    }

    /// Write one log entry attributed to this backend
    fn log(&self, severity: Severity, lines: &[&str]) {
        self.log_sink()
            .write(&[LogEntry::new(self.backend_id(), severity, lines)]);
    }
}

// =============================================================================
// Router
// =============================================================================

/// Receives inbound messages from backends.
///
/// Called from the transport's delivery context, so implementations must
/// return quickly and never block.
pub trait Router: Send + Sync {
    fn incoming(&self, message: IncomingMessage);
}
