// ABOUTME: Errors from modem drivers: selecting one, opening its port, and initializing a session.
// ABOUTME: Backends classify these into connection vs initialization failures.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModemError {
    /// Nothing is attached at the given port (missing device file)
    #[error("no such device: {port}")]
    PortNotFound { port: String },

    /// The port argument itself was unusable
    #[error("invalid port {port}: {reason}")]
    InvalidPort { port: String, reason: String },

    /// The modem answered but something went wrong during setup
    #[error("modem error: {desc}")]
    Modem { desc: String },

    /// No driver is registered under this name
    #[error("Unknown modem driver: {name} (available: {})", available.join(", "))]
    UnknownDriver { name: String, available: Vec<String> },

    /// The driver rejected its options table
    #[error("invalid options for modem driver {driver}: {reason}")]
    DriverOptions { driver: String, reason: String },
}

impl ModemError {
    pub fn modem(desc: impl Into<String>) -> Self {
        ModemError::Modem { desc: desc.into() }
    }

    pub fn driver_options(driver: &str, reason: impl ToString) -> Self {
        ModemError::DriverOptions {
            driver: driver.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True when the port could not be opened at all
    pub fn is_port_unavailable(&self) -> bool {
        matches!(
            self,
            ModemError::PortNotFound { .. } | ModemError::InvalidPort { .. }
        )
    }

    /// Human-readable detail as the modem library phrased it
    pub fn desc(&self) -> String {
        match self {
            ModemError::Modem { desc } => desc.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_errors_are_unavailable() {
        let missing = ModemError::PortNotFound {
            port: "/dev/ttyUSB9".to_string(),
        };
        let invalid = ModemError::InvalidPort {
            port: "".to_string(),
            reason: "empty".to_string(),
        };
        assert!(missing.is_port_unavailable());
        assert!(invalid.is_port_unavailable());
        assert!(!ModemError::modem("SIM busy").is_port_unavailable());
    }

    #[test]
    fn test_unknown_driver_lists_alternatives() {
        let err = ModemError::UnknownDriver {
            name: "huawei".to_string(),
            available: vec!["bench".to_string(), "virtual".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown modem driver: huawei (available: bench, virtual)"
        );
        assert!(!err.is_port_unavailable());
    }

    #[test]
    fn test_desc_is_verbatim_for_modem_errors() {
        assert_eq!(ModemError::modem("CME ERROR 11").desc(), "CME ERROR 11");
    }
}
