// ABOUTME: Modem transport contract for smsgate.
// ABOUTME: Defines the session traits backends consume, plus a driver registry and a virtual modem.

pub mod config;
pub mod error;
pub mod event;
pub mod port;
pub mod registry;
pub mod traits;

pub mod drivers;

pub use config::DriverConfig;
pub use error::ModemError;
pub use event::{ModemIncoming, SignalQuality};
pub use port::Port;
pub use registry::{DriverFactory, ModemRegistry};
pub use traits::{InboundHandler, ModemConnector, ModemSession};
