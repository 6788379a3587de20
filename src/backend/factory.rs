// ABOUTME: Backend factory that turns configuration into running backend instances
// ABOUTME: Resolves the modem driver by name and wires each backend to the shared router

use anyhow::{Context, Result};
use smsgate_core::{Backend, BackendRegistry, Router};
use smsgate_modem::ModemRegistry;
use std::sync::Arc;

use super::gsm::{GsmBackend, KIND as GSM};
use crate::config::Config;

/// Create one backend by kind from the current config.
pub fn create_backend(
    config: &Config,
    kind: &str,
    modems: &ModemRegistry,
    router: Arc<dyn Router>,
) -> Result<Arc<dyn Backend>> {
    match kind {
        GSM => {
            let gsm = config
                .gsm
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("GSM backend not configured. Add a [gsm] section."))?;
            let connector = modems
                .connector_for(&gsm.modem)
                .with_context(|| format!("Failed to create modem driver '{}'", gsm.modem.driver_type()))?;
            tracing::debug!(
                backend = %gsm.id,
                driver = connector.name(),
                port = %gsm.port,
                "Creating GSM backend"
            );
            let backend = GsmBackend::new(gsm.settings(), connector, router).with_id(gsm.id.clone());
            Ok(Arc::new(backend))
        }
        _ => anyhow::bail!("Unknown backend: {}", kind),
    }
}

/// Build a registry holding every backend the config enables.
pub fn build_registry(
    config: &Config,
    modems: &ModemRegistry,
    router: Arc<dyn Router>,
) -> Result<BackendRegistry> {
    let mut registry = BackendRegistry::new();

    if config.gsm.is_some() {
        registry.register(create_backend(config, GSM, modems, Arc::clone(&router))?);
    }

    if registry.is_empty() {
        anyhow::bail!("No backends configured. Add a [gsm] section or set GSM_PORT.");
    }
    Ok(registry)
}
