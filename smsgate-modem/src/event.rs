// ABOUTME: Values produced by a modem session: inbound messages and signal readings.
// ABOUTME: These are transport-native and get translated by the backend before routing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An SMS as the modem reports it, before any framework translation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModemIncoming {
    /// Originating address (e.g. "+15557654321")
    pub sender: String,
    /// Timestamp from the SMSC, when the network supplied one
    pub sent: DateTime<Utc>,
    /// Decoded message body
    pub text: String,
}

impl ModemIncoming {
    pub fn new(sender: impl Into<String>, sent: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            sent,
            text: text.into(),
        }
    }
}

/// Received signal quality as reported by `AT+CSQ`.
///
/// Values 0..=31 are valid readings; 99 means the modem could not tell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SignalQuality(pub u8);

impl SignalQuality {
    pub const UNKNOWN: SignalQuality = SignalQuality(99);

    pub fn is_known(&self) -> bool {
        self.0 <= 31
    }
}

impl fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("unknown")
        }
    }
}
