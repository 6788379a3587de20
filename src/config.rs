// ABOUTME: Configuration parsing from TOML file with environment variable overrides
// ABOUTME: Validates the GSM section and provides sensible defaults for optional fields
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use smsgate_modem::{DriverConfig, Port};
use std::fmt;
use std::path::PathBuf;

use crate::backend::gsm::{GsmSettings, KIND as GSM};
use crate::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsm: Option<GsmConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GsmConfig {
    /// Backend id, used as the origin of inbound messages
    #[serde(default = "default_backend_id")]
    pub id: String,
    /// Device path, or "auto" to let the driver probe
    #[serde(default)]
    pub port: Port,
    /// SIM PIN, applied before waiting for the network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(default)]
    pub modem: DriverConfig,
}

// Custom Debug impl to redact the PIN
impl fmt::Debug for GsmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GsmConfig")
            .field("id", &self.id)
            .field("port", &self.port)
            .field("pin", &self.pin.as_ref().map(|_| "[REDACTED]"))
            .field("modem", &self.modem)
            .finish()
    }
}

impl Default for GsmConfig {
    fn default() -> Self {
        Self {
            id: default_backend_id(),
            port: Port::Auto,
            pin: None,
            modem: DriverConfig::default(),
        }
    }
}

impl GsmConfig {
    pub fn settings(&self) -> GsmSettings {
        GsmSettings::new(self.port.clone(), self.pin.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for daily-rotated JSON logs; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

fn default_backend_id() -> String {
    GSM.to_string()
}

/// Expand tilde (~) to home directory in paths
/// Logs a warning if expansion fails and falls back to the original path
fn expand_tilde(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(base_dirs) = directories::BaseDirs::new() {
            return base_dirs
                .home_dir()
                .join(stripped)
                .to_string_lossy()
                .to_string();
        }
        tracing::warn!(
            path = %path,
            "Failed to expand tilde in path: could not determine home directory"
        );
    }
    path.to_string()
}

impl Config {
    /// Find the config file, checking multiple locations in order:
    /// 1. SMSGATE_CONFIG_PATH env var (if set)
    /// 2. ./smsgate.toml (current directory - for development)
    /// 3. the platform config dir (e.g. ~/.config/smsgate/config.toml)
    fn find_config_file() -> Option<PathBuf> {
        if let Ok(env_path) = std::env::var("SMSGATE_CONFIG_PATH") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Some(path);
            }
            tracing::warn!(path = %env_path, "SMSGATE_CONFIG_PATH does not exist, ignoring");
        }

        let local_config = PathBuf::from("smsgate.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        paths::config_file().filter(|p| p.exists())
    }

    /// Parse a config from TOML without env overrides or validation
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    /// Load configuration with environment variable overrides, then validate.
    /// Searches: SMSGATE_CONFIG_PATH env var, ./smsgate.toml, then the platform config dir
    pub fn load() -> Result<Self> {
        let mut config = if let Some(config_path) = Self::find_config_file() {
            tracing::info!(
                path = %config_path.display(),
                "Loading configuration from file"
            );
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            tracing::info!("No config file found, using environment variables and defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override config values from GSM_* and SMSGATE_* environment variables.
    /// Any GSM_* variable enables the GSM backend when the file did not.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GSM_PORT") {
            self.gsm.get_or_insert_with(GsmConfig::default).port = val.parse().unwrap_or_default();
        }
        if let Ok(val) = std::env::var("GSM_PIN") {
            self.gsm.get_or_insert_with(GsmConfig::default).pin = Some(val);
            // Clear from environment to prevent exposure via /proc or ps
            std::env::remove_var("GSM_PIN");
        }
        if let Ok(val) = std::env::var("GSM_MODEM_DRIVER") {
            let modem = &mut self.gsm.get_or_insert_with(GsmConfig::default).modem;
            // Options belong to the driver they were written for
            if modem.driver_type != val {
                *modem = DriverConfig::named(val);
            }
        }
        if let Ok(val) = std::env::var("SMSGATE_LOG_DIR") {
            self.logging.dir = Some(val);
        }

        if let Some(dir) = self.logging.dir.as_mut() {
            *dir = expand_tilde(dir);
        }
    }

    /// Check field values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if let Some(ref gsm) = self.gsm {
            if gsm.id.trim().is_empty() {
                anyhow::bail!("gsm.id must not be empty");
            }
            if let Port::Device(path) = &gsm.port {
                if path.trim().is_empty() {
                    anyhow::bail!(
                        "gsm.port must be a device path or \"auto\" (set in config or GSM_PORT env var)"
                    );
                }
            }
            if let Some(ref pin) = gsm.pin {
                let valid = (4..=8).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit());
                if !valid {
                    anyhow::bail!("gsm.pin must be 4 to 8 digits");
                }
            }
            if gsm.modem.driver_type().trim().is_empty() {
                anyhow::bail!("gsm.modem.type must name a modem driver");
            }
        }
        Ok(())
    }

    /// TOML rendering with secrets redacted, for `check-config`
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut redacted = self.clone();
        if let Some(pin) = redacted.gsm.as_mut().and_then(|g| g.pin.as_mut()) {
            *pin = "[REDACTED]".to_string();
        }
        toml::to_string_pretty(&redacted).context("Failed to render config")
    }
}
