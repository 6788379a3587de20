// ABOUTME: Modem driver configuration as it appears in TOML.
// ABOUTME: A `type` discriminator picks the driver; the rest of the table is driver options.

use crate::error::ModemError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Driver configuration with type discriminator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverConfig {
    /// Driver type: "virtual", or any name registered with the registry
    #[serde(rename = "type")]
    pub driver_type: String,

    /// Remaining fields passed to the driver factory
    #[serde(flatten)]
    pub options: toml::Table,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::named(crate::drivers::virtual_modem::DRIVER_NAME)
    }
}

impl DriverConfig {
    /// Driver with no options
    pub fn named(driver_type: impl Into<String>) -> Self {
        Self {
            driver_type: driver_type.into(),
            options: toml::Table::new(),
        }
    }

    /// Parse a driver table from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse modem driver TOML")
    }

    pub fn driver_type(&self) -> &str {
        &self.driver_type
    }

    /// Convert the options table to the JSON value factories receive
    pub fn to_json_value(&self) -> Result<serde_json::Value, ModemError> {
        serde_json::to_value(&self.options)
            .map_err(|e| ModemError::driver_options(&self.driver_type, e))
    }
}
