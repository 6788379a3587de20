// ABOUTME: Transport-agnostic SMS backend contract for smsgate
// ABOUTME: Provides the Backend/Router traits, message model, error taxonomy, and routing glue

pub mod error;
pub mod log;
pub mod message;
pub mod registry;
pub mod router;
pub mod testing;
pub mod traits;

pub use error::{BackendError, ErrorKind};
pub use log::{LogEntry, LogSink, Severity, StartupLog, TracingSink};
pub use message::{IncomingMessage, OutgoingMessage};
pub use registry::{BackendHealth, BackendRegistry};
pub use router::{ChannelRouter, Inbox, MessageStream};
pub use traits::{Backend, BackendState, Router, SendOutcome};
