// ABOUTME: Root library module for the smsgate gateway
// ABOUTME: Exposes the GSM backend, backend factory, config, and logging setup

pub mod backend;
pub mod config;
pub mod logging;
pub mod paths;

// Re-export the backend contract and modem layer for convenience
pub use smsgate_core::{
    Backend, BackendError, BackendRegistry, BackendState, ChannelRouter, IncomingMessage,
    OutgoingMessage, Router, SendOutcome,
};
pub use smsgate_modem::{ModemRegistry, Port};
