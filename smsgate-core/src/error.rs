// ABOUTME: Error taxonomy every backend reports through.
// ABOUTME: Transport-specific failures are translated into these kinds at the backend boundary.

use crate::traits::BackendState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The configured port or device could not be opened
    #[error("couldn't open {port}: {reason}")]
    Connection { port: String, reason: String },

    /// The transport opened but failed during device-level setup
    #[error("couldn't initialize the transport: {detail}")]
    Initialization { detail: String },

    /// The caller handed `send` a malformed message
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `send` was called on a backend that never reached Ready
    #[error("backend {backend} is not ready (state: {state})")]
    NotReady { backend: String, state: BackendState },

    /// `start` was called more than once
    #[error("backend {backend} was already started (state: {state})")]
    AlreadyStarted { backend: String, state: BackendState },

    /// No registered backend has this id
    #[error("unknown backend: {0}")]
    UnknownBackend(String),
}

/// Typed error codes for programmatic handling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Initialization,
    InvalidArgument,
    NotReady,
    AlreadyStarted,
    UnknownBackend,
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Connection { .. } => ErrorKind::Connection,
            BackendError::Initialization { .. } => ErrorKind::Initialization,
            BackendError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            BackendError::NotReady { .. } => ErrorKind::NotReady,
            BackendError::AlreadyStarted { .. } => ErrorKind::AlreadyStarted,
            BackendError::UnknownBackend(_) => ErrorKind::UnknownBackend,
        }
    }
}
