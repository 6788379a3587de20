// ABOUTME: GSM backend - drives a modem session on behalf of the smsgate backend contract
// ABOUTME: Guards one-time start, translates modem errors, and forwards inbound SMS to the router

use async_trait::async_trait;
use smsgate_core::{
    Backend, BackendError, BackendState, IncomingMessage, LogSink, OutgoingMessage, Router,
    SendOutcome, Severity, StartupLog, TracingSink,
};
use smsgate_modem::{InboundHandler, ModemConnector, ModemError, ModemIncoming, ModemSession, Port};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

/// Transport family reported by [`Backend::kind`], also the default backend id
pub const KIND: &str = "gsm";

/// What the backend needs to reach its modem
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GsmSettings {
    pub port: Port,
    pub pin: Option<String>,
}

impl GsmSettings {
    pub fn new(port: Port, pin: Option<String>) -> Self {
        Self { port, pin }
    }
}

// Custom Debug impl to redact the PIN
impl fmt::Debug for GsmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GsmSettings")
            .field("port", &self.port)
            .field("pin", &self.pin.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Backend that sends and receives SMS through a GSM modem.
///
/// Construction only stores its arguments. `start` opens the modem, unlocks
/// the SIM, registers for inbound SMS, and waits for the network; it may
/// take several seconds and succeeds at most once per instance.
pub struct GsmBackend {
    id: String,
    settings: GsmSettings,
    connector: Arc<dyn ModemConnector>,
    router: Arc<dyn Router>,
    sink: Arc<dyn LogSink>,
    state: Mutex<BackendState>,
    session: OnceLock<Arc<dyn ModemSession>>,
}

impl GsmBackend {
    pub fn new(
        settings: GsmSettings,
        connector: Arc<dyn ModemConnector>,
        router: Arc<dyn Router>,
    ) -> Self {
        Self {
            id: KIND.to_string(),
            settings,
            connector,
            router,
            sink: Arc::new(TracingSink),
            state: Mutex::new(BackendState::Unstarted),
            session: OnceLock::new(),
        }
    }

    /// Use a different backend id (needed when running several modems)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn settings(&self) -> &GsmSettings {
        &self.settings
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: BackendState) {
        *self.lock_state() = state;
    }

    /// Admit exactly one caller into `start`.
    ///
    /// The returned guard marks the backend `Failed` unless it is finished,
    /// so a start future dropped mid-flight does not stay `Starting`.
    fn begin_start(&self) -> Result<StartAttempt<'_>, BackendError> {
        let mut state = self.lock_state();
        if *state != BackendState::Unstarted {
            return Err(BackendError::AlreadyStarted {
                backend: self.id.clone(),
                state: *state,
            });
        }
        *state = BackendState::Starting;
        Ok(StartAttempt {
            backend: self,
            finished: false,
        })
    }

    async fn open_session(
        &self,
        log: &mut StartupLog<'_>,
    ) -> Result<Arc<dyn ModemSession>, BackendError> {
        let port = &self.settings.port;

        let session: Arc<dyn ModemSession> = match self.connector.open(port).await {
            Ok(session) => Arc::from(session),
            Err(err) if err.is_port_unavailable() => {
                let line = format!("Couldn't open {}", port);
                log.err(&[line.as_str()]);
                return Err(BackendError::Connection {
                    port: port.to_string(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(initialization_failure(log, err)),
        };

        if let Some(pin) = &self.settings.pin {
            session
                .use_pin(pin)
                .await
                .map_err(|err| initialization_failure(log, err))?;
        }

        session.receive(self.inbound_handler());

        log.info("Waiting for GSM network...");
        let signal = session
            .wait_for_network()
            .await
            .map_err(|err| initialization_failure(log, err))?;
        log.info(&format!("Signal strength is: {}", signal));

        Ok(session)
    }

    /// Translate modem SMS into framework messages and hand them to the router
    fn inbound_handler(&self) -> InboundHandler {
        let origin = self.id.clone();
        let router = Arc::clone(&self.router);
        Arc::new(move |msg: ModemIncoming| {
            router.incoming(IncomingMessage::new(
                origin.clone(),
                msg.sender,
                msg.sent,
                msg.text,
            ));
        })
    }
}

/// An admitted `start` that has not reached `Ready` or `Failed` yet
struct StartAttempt<'a> {
    backend: &'a GsmBackend,
    finished: bool,
}

impl StartAttempt<'_> {
    fn finish(mut self, state: BackendState) {
        self.finished = true;
        self.backend.set_state(state);
    }
}

impl Drop for StartAttempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(backend = %self.backend.id, "GSM backend start abandoned before completion");
            self.backend.set_state(BackendState::Failed);
        }
    }
}

fn initialization_failure(log: &mut StartupLog<'_>, err: ModemError) -> BackendError {
    let detail = err.desc();
    let says = format!("Modem says: {}", detail);
    log.err(&["Couldn't initialize the modem", says.as_str()]);
    BackendError::Initialization { detail }
}

#[async_trait]
impl Backend for GsmBackend {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn backend_id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> BackendState {
        *self.lock_state()
    }

    fn log_sink(&self) -> &dyn LogSink {
        self.sink.as_ref()
    }

    async fn start(&self) -> Result<(), BackendError> {
        let attempt = self.begin_start()?;
        tracing::debug!(
            backend = %self.id,
            driver = self.connector.name(),
            port = %self.settings.port,
            "Starting GSM backend"
        );

        let mut log = StartupLog::new(self.id.clone(), self.sink.as_ref());
        match self.open_session(&mut log).await {
            Ok(session) => {
                // begin_start admits one caller, so the cell is always empty here
                let _ = self.session.set(session);
                attempt.finish(BackendState::Ready);
                log.init("Started GSM Backend");
                Ok(())
            }
            Err(err) => {
                attempt.finish(BackendState::Failed);
                Err(err)
            }
        }
    }

    async fn send(&self, message: &OutgoingMessage) -> Result<SendOutcome, BackendError> {
        self.check_outgoing(message)?;

        let session = self.session.get().ok_or_else(|| BackendError::NotReady {
            backend: self.id.clone(),
            state: self.state(),
        })?;

        if session.send_sms(message.recipient(), message.text()).await {
            tracing::debug!(backend = %self.id, recipient = %message.recipient(), "SMS sent");
            Ok(SendOutcome::Sent)
        } else {
            // The modem gives no reason beyond the refusal itself
            self.log(Severity::Warn, &["Message sending FAILED"]);
            Ok(SendOutcome::Failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smsgate_core::testing::RecordingRouter;
    use smsgate_modem::drivers::virtual_modem::VirtualModem;

    #[test]
    fn test_settings_debug_redacts_pin() {
        let settings = GsmSettings::new(Port::device("/dev/ttyUSB0"), Some("1234".to_string()));
        let debug = format!("{:?}", settings);
        assert!(debug.contains("/dev/ttyUSB0"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("1234"));
    }

    #[test]
    fn test_new_defaults() {
        let backend = GsmBackend::new(
            GsmSettings::default(),
            Arc::new(VirtualModem::new()),
            Arc::new(RecordingRouter::new()),
        );
        assert_eq!(backend.backend_id(), "gsm");
        assert_eq!(backend.kind(), "gsm");
        assert_eq!(backend.state(), BackendState::Unstarted);
        assert!(backend.settings().port.is_auto());
    }
}
