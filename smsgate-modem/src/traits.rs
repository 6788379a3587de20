// ABOUTME: Core modem traits that every driver implements.
// ABOUTME: A connector opens sessions; a session sends, receives, and waits for the network.

use crate::{ModemError, ModemIncoming, Port, SignalQuality};
use async_trait::async_trait;
use std::sync::Arc;

/// Callback invoked by a session for every inbound SMS.
///
/// Sessions call this from their own delivery context, so it must be cheap
/// and must not block.
pub type InboundHandler = Arc<dyn Fn(ModemIncoming) + Send + Sync>;

/// Opens sessions against a physical or simulated modem
#[async_trait]
pub trait ModemConnector: Send + Sync {
    /// Driver name for logging
    fn name(&self) -> &'static str;

    /// Open the port and bring the modem to a state where commands are accepted.
    ///
    /// Fails with a port-unavailable error when the device cannot be opened and
    /// with [`ModemError::Modem`] when the modem rejects its setup commands.
    async fn open(&self, port: &Port) -> Result<Box<dyn ModemSession>, ModemError>;
}

/// A live connection to one modem
#[async_trait]
pub trait ModemSession: Send + Sync {
    /// Unlock the SIM with its PIN
    async fn use_pin(&self, pin: &str) -> Result<(), ModemError>;

    /// Register the inbound handler. Replaces any previous handler.
    fn receive(&self, handler: InboundHandler);

    /// Block until the modem is registered on a network, returning the signal reading
    async fn wait_for_network(&self) -> Result<SignalQuality, ModemError>;

    /// Submit one SMS. The modem only reports whether it accepted the message.
    async fn send_sms(&self, recipient: &str, text: &str) -> bool;
}
