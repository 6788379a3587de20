// ABOUTME: Modem port selection: a device path or the auto-detect sentinel.
// ABOUTME: Serializes as a plain string so it reads naturally in TOML.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Where to find the modem
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Port {
    /// Let the driver probe for a modem
    #[default]
    Auto,
    /// Explicit device, e.g. "/dev/ttyUSB0" or "COM3"
    Device(String),
}

impl Port {
    pub const AUTO: &'static str = "auto";

    pub fn device(path: impl Into<String>) -> Self {
        Port::Device(path.into())
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Port::Auto)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Auto => f.write_str(Self::AUTO),
            Port::Device(path) => f.write_str(path),
        }
    }
}

impl FromStr for Port {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(Self::AUTO) {
            Ok(Port::Auto)
        } else {
            Ok(Port::Device(s.to_string()))
        }
    }
}

impl Serialize for Port {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Port {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Infallible
        Ok(raw.parse().unwrap_or_default())
    }
}
