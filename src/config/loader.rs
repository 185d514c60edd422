//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ConfigUpdate;

pub const ENV_HOST: &str = "DEBUG_DUMP_HOST";
pub const ENV_PORT: &str = "DEBUG_DUMP_PORT";
pub const ENV_ENABLED: &str = "DEBUG_DUMP_ENABLED";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {key}")]
    Env { key: &'static str, value: String },
}

/// Load a partial configuration from a TOML file.
///
/// Every key is optional:
/// ```toml
/// host = "127.0.0.1"
/// port = 8765
/// enabled = true
/// ```
pub fn load_config(path: &Path) -> Result<ConfigUpdate, ConfigError> {
    let content = fs::read_to_string(path)?;
    let update: ConfigUpdate = toml::from_str(&content)?;
    Ok(update)
}

impl ConfigUpdate {
    /// Read `DEBUG_DUMP_HOST`, `DEBUG_DUMP_PORT` and `DEBUG_DUMP_ENABLED`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut update = ConfigUpdate::new();

        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            update.host = Some(host.trim().to_string());
        }

        if let Some(port) = lookup(ENV_PORT) {
            let parsed = port.trim().parse().map_err(|_| ConfigError::Env {
                key: ENV_PORT,
                value: port.clone(),
            })?;
            update.port = Some(parsed);
        }

        if let Some(enabled) = lookup(ENV_ENABLED) {
            update.enabled = Some(parse_flag(&enabled).ok_or(ConfigError::Env {
                key: ENV_ENABLED,
                value: enabled.clone(),
            })?);
        }

        Ok(update)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
