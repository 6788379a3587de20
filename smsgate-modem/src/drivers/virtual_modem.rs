// ABOUTME: Virtual modem driver - an in-memory GSM modem with scripted behavior.
// ABOUTME: Used for dry runs without hardware and as the transport double in tests.
//!
//! # Example
//!
//! ```no_run
//! use smsgate_modem::drivers::virtual_modem::VirtualModem;
//! use smsgate_modem::{ModemConnector, ModemIncoming, ModemSession, Port};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let modem = VirtualModem::new().with_signal(18);
//! let probe = modem.probe();
//!
//! let session = modem.open(&Port::Auto).await.unwrap();
//! session.receive(Arc::new(|msg: ModemIncoming| println!("{}: {}", msg.sender, msg.text)));
//! let signal = session.wait_for_network().await.unwrap();
//! assert_eq!(signal.0, 18);
//!
//! assert!(session.send_sms("+15551234567", "hello").await);
//! assert_eq!(probe.sent()[0].text, "hello");
//! # }
//! ```

use crate::registry::DriverFactory;
use crate::{
    InboundHandler, ModemConnector, ModemError, ModemIncoming, ModemSession, Port, SignalQuality,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Registry name of this driver
pub const DRIVER_NAME: &str = "virtual";

const DEFAULT_SIGNAL: u8 = 20;

/// Options accepted from the `[gsm.modem]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VirtualModemConfig {
    /// Signal reading reported once the network is up
    pub signal: Option<u8>,
    /// Refuse every outgoing SMS
    pub reject_sends: bool,
    /// Simulated network registration time
    pub network_delay_ms: u64,
    /// When set, any other PIN is refused
    pub expected_pin: Option<String>,
}

/// One outgoing SMS the modem was asked to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub recipient: String,
    pub text: String,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
struct Script {
    signal: SignalQuality,
    open_error: Option<ModemError>,
    expected_pin: Option<String>,
    network_error: Option<String>,
    reject_sends: bool,
    network_delay: Duration,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            signal: SignalQuality(DEFAULT_SIGNAL),
            open_error: None,
            expected_pin: None,
            network_error: None,
            reject_sends: false,
            network_delay: Duration::ZERO,
        }
    }
}

#[derive(Default)]
struct Shared {
    opened: Mutex<Vec<Port>>,
    pins: Mutex<Vec<String>>,
    sent: Mutex<Vec<SentSms>>,
    inbound: Mutex<Option<(u64, mpsc::UnboundedSender<ModemIncoming>)>>,
    session_counter: AtomicU64,
}

impl Shared {
    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// In-memory modem connector
pub struct VirtualModem {
    script: Script,
    shared: Arc<Shared>,
}

impl VirtualModem {
    /// A modem that opens, registers, and accepts every SMS
    pub fn new() -> Self {
        Self {
            script: Script::default(),
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn from_config(config: VirtualModemConfig) -> Self {
        let mut modem = Self::new()
            .with_signal(config.signal.unwrap_or(DEFAULT_SIGNAL))
            .with_network_delay(Duration::from_millis(config.network_delay_ms));
        if config.reject_sends {
            modem = modem.reject_sends();
        }
        if let Some(pin) = config.expected_pin {
            modem = modem.expect_pin(pin);
        }
        modem
    }

    pub fn with_signal(mut self, signal: u8) -> Self {
        self.script.signal = SignalQuality(signal);
        self
    }

    pub fn with_network_delay(mut self, delay: Duration) -> Self {
        self.script.network_delay = delay;
        self
    }

    /// Make `open` fail with the given error
    pub fn fail_open(mut self, error: ModemError) -> Self {
        self.script.open_error = Some(error);
        self
    }

    /// Refuse any PIN other than this one
    pub fn expect_pin(mut self, pin: impl Into<String>) -> Self {
        self.script.expected_pin = Some(pin.into());
        self
    }

    /// Make `wait_for_network` fail with the given modem description
    pub fn fail_network(mut self, desc: impl Into<String>) -> Self {
        self.script.network_error = Some(desc.into());
        self
    }

    /// Make `send_sms` report failure
    pub fn reject_sends(mut self) -> Self {
        self.script.reject_sends = true;
        self
    }

    /// Inspection handle that stays valid after the connector is moved
    pub fn probe(&self) -> ModemProbe {
        ModemProbe {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Factory function for the registry
    pub fn factory() -> DriverFactory {
        Box::new(|options| {
            let config: VirtualModemConfig = serde_json::from_value(options.clone())
                .map_err(|e| ModemError::driver_options(DRIVER_NAME, e))?;
            Ok(Arc::new(VirtualModem::from_config(config)) as Arc<dyn ModemConnector>)
        })
    }
}

impl Default for VirtualModem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModemConnector for VirtualModem {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    async fn open(&self, port: &Port) -> Result<Box<dyn ModemSession>, ModemError> {
        Shared::lock(&self.shared.opened).push(port.clone());

        if let Some(error) = &self.script.open_error {
            tracing::debug!(%port, error = %error, "Virtual modem refusing to open");
            return Err(error.clone());
        }

        let id = self.shared.session_counter.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(%port, session = id, "Virtual modem session opened");

        Ok(Box::new(VirtualSession {
            id,
            script: self.script.clone(),
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct VirtualSession {
    id: u64,
    script: Script,
    shared: Arc<Shared>,
}

#[async_trait]
impl ModemSession for VirtualSession {
    async fn use_pin(&self, pin: &str) -> Result<(), ModemError> {
        Shared::lock(&self.shared.pins).push(pin.to_string());
        match &self.script.expected_pin {
            Some(expected) if expected != pin => {
                Err(ModemError::modem("SIM PIN rejected (CME ERROR 16: incorrect password)"))
            }
            _ => Ok(()),
        }
    }

    fn receive(&self, handler: InboundHandler) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ModemIncoming>();

        // Delivery runs on its own task, the way a serial reader thread would
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                handler(msg);
            }
        });

        // Replacing the sender closes the previous delivery task's channel
        *Shared::lock(&self.shared.inbound) = Some((self.id, tx));
    }

    async fn wait_for_network(&self) -> Result<SignalQuality, ModemError> {
        if !self.script.network_delay.is_zero() {
            tokio::time::sleep(self.script.network_delay).await;
        }
        match &self.script.network_error {
            Some(desc) => Err(ModemError::modem(desc.clone())),
            None => Ok(self.script.signal),
        }
    }

    async fn send_sms(&self, recipient: &str, text: &str) -> bool {
        let accepted = !self.script.reject_sends;
        Shared::lock(&self.shared.sent).push(SentSms {
            recipient: recipient.to_string(),
            text: text.to_string(),
            accepted,
        });
        accepted
    }
}

impl Drop for VirtualSession {
    fn drop(&mut self) {
        // Closing the port stops delivery, but only for this session's handler
        let mut inbound = Shared::lock(&self.shared.inbound);
        if inbound.as_ref().map(|(id, _)| *id) == Some(self.id) {
            *inbound = None;
        }
    }
}

/// Read-only view of a virtual modem plus the ability to inject inbound SMS
#[derive(Clone)]
pub struct ModemProbe {
    shared: Arc<Shared>,
}

impl ModemProbe {
    /// Ports passed to `open`, in call order
    pub fn opened_ports(&self) -> Vec<Port> {
        Shared::lock(&self.shared.opened).clone()
    }

    /// PINs passed to `use_pin`, in call order
    pub fn pins(&self) -> Vec<String> {
        Shared::lock(&self.shared.pins).clone()
    }

    /// Every `send_sms` call, in call order
    pub fn sent(&self) -> Vec<SentSms> {
        Shared::lock(&self.shared.sent).clone()
    }

    /// Whether a live session has an inbound handler registered
    pub fn has_handler(&self) -> bool {
        Shared::lock(&self.shared.inbound).is_some()
    }

    /// Simulate an SMS arriving from the network.
    ///
    /// Returns false when no handler is registered and the message was dropped.
    pub fn deliver(&self, msg: ModemIncoming) -> bool {
        match Shared::lock(&self.shared.inbound).as_ref() {
            Some((_, tx)) => tx.send(msg).is_ok(),
            None => false,
        }
    }
}
