// ABOUTME: Named modem drivers, resolved from the `[gsm.modem]` table at startup.
// ABOUTME: Each driver registers a factory that turns its options into a connector.

use crate::config::DriverConfig;
use crate::error::ModemError;
use crate::traits::ModemConnector;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds a connector from a driver's options table (as JSON)
pub type DriverFactory =
    Box<dyn Fn(&Value) -> Result<Arc<dyn ModemConnector>, ModemError> + Send + Sync>;

/// Modem drivers available to the gateway, keyed by the name used in `type = "..."`
pub struct ModemRegistry {
    drivers: BTreeMap<String, DriverFactory>,
}

impl ModemRegistry {
    /// A registry with no drivers; see `Default` for the built-in set
    pub fn new() -> Self {
        Self {
            drivers: BTreeMap::new(),
        }
    }

    /// Add a driver. A later registration under the same name wins.
    pub fn register<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&Value) -> Result<Arc<dyn ModemConnector>, ModemError> + Send + Sync + 'static,
    {
        self.drivers.insert(name.to_string(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    /// Driver names, sorted
    pub fn available(&self) -> Vec<&str> {
        self.drivers.keys().map(String::as_str).collect()
    }

    /// Build a connector for `name` from raw options
    pub fn create(&self, name: &str, options: &Value) -> Result<Arc<dyn ModemConnector>, ModemError> {
        let factory = self
            .drivers
            .get(name)
            .ok_or_else(|| ModemError::UnknownDriver {
                name: name.to_string(),
                available: self.drivers.keys().cloned().collect(),
            })?;
        let connector = factory(options)?;
        tracing::debug!(driver = name, "Modem driver ready");
        Ok(connector)
    }

    /// Build the connector a `[gsm.modem]` table asks for
    pub fn connector_for(&self, config: &DriverConfig) -> Result<Arc<dyn ModemConnector>, ModemError> {
        let options = config.to_json_value()?;
        self.create(config.driver_type(), &options)
    }
}

impl Default for ModemRegistry {
    fn default() -> Self {
        use crate::drivers::virtual_modem::{VirtualModem, DRIVER_NAME};

        Self::new().register(DRIVER_NAME, VirtualModem::factory())
    }
}
