//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Where envelopes are sent, and whether they are sent at all.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DumpConfig {
    /// Debug server host (name or IP address).
    pub host: String,

    /// Debug server port.
    pub port: u16,

    /// When false every send is a no-op.
    pub enabled: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
            enabled: true,
        }
    }
}

impl DumpConfig {
    /// Apply the fields set in `update`, keeping the rest.
    pub fn merge(&self, update: &ConfigUpdate) -> Self {
        Self {
            host: update.host.clone().unwrap_or_else(|| self.host.clone()),
            port: update.port.unwrap_or(self.port),
            enabled: update.enabled.unwrap_or(self.enabled),
        }
    }

    /// The `/dump` endpoint URL, e.g. `http://127.0.0.1:8765/dump`.
    pub fn endpoint(&self) -> Result<url::Url, url::ParseError> {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        url::Url::parse(&format!("http://{}:{}/dump", host, self.port))
    }
}

/// A partial configuration. Unset fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub enabled: Option<bool>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn and(self, other: ConfigUpdate) -> Self {
        Self {
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            enabled: other.enabled.or(self.enabled),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.host.is_none() && self.port.is_none() && self.enabled.is_none()
    }
}
