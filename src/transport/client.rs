//! HTTP client that forwards envelopes to the debug server.
//!
//! # Responsibilities
//! - Stamp and encode envelopes
//! - POST once to `http://{host}:{port}/dump` with a fixed timeout
//! - Swallow every failure; the host application never sees one
//! - Run in the background so callers never wait on network I/O

use std::panic::Location;
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::timeout;

use crate::config::{ConfigUpdate, DumpConfig, SharedConfig};
use crate::entry::location::{CallerLocator, TrackCaller};
use crate::observability::metrics;
use crate::transport::envelope::{Envelope, EnvelopeFields, SourceLocation};
use crate::transport::handle::{Delivery, SendHandle};

/// Upper bound for one send attempt, connect included.
pub const SEND_TIMEOUT: Duration = Duration::from_millis(1000);

/// Why an envelope did not reach the server. Only ever logged.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

static GLOBAL: OnceLock<DumpClient> = OnceLock::new();

/// Client for the debug server.
///
/// Cloning is cheap and clones share configuration.
#[derive(Clone)]
pub struct DumpClient {
    http: reqwest::Client,
    config: SharedConfig,
    locator: Arc<dyn CallerLocator>,
}

impl DumpClient {
    /// Create a client with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DumpConfig::default())
    }

    pub fn with_config(config: DumpConfig) -> Self {
        Self::with_shared_config(SharedConfig::new(config))
    }

    /// Create a client reading from an existing configuration cell.
    pub fn with_shared_config(config: SharedConfig) -> Self {
        Self {
            http: build_http_client(),
            config,
            locator: Arc::new(TrackCaller),
        }
    }

    /// Replace how call sites are resolved.
    pub fn with_locator(mut self, locator: impl CallerLocator + 'static) -> Self {
        self.locator = Arc::new(locator);
        self
    }

    /// The process-wide client used by the free functions.
    pub fn global() -> &'static DumpClient {
        GLOBAL.get_or_init(DumpClient::new)
    }

    /// Merge `update` over the current configuration.
    pub fn configure(&self, update: ConfigUpdate) {
        self.config.apply(&update);
    }

    pub fn config(&self) -> Arc<DumpConfig> {
        self.config.load()
    }

    pub fn shared_config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    pub(crate) fn locate(&self, caller: &'static Location<'static>) -> Option<SourceLocation> {
        self.locator.locate(caller)
    }

    /// Send an envelope in the background.
    ///
    /// Returns immediately. The attempt runs on the ambient tokio runtime, or
    /// on a short-lived thread when there is none.
    pub fn send(&self, fields: EnvelopeFields) -> SendHandle {
        let config = self.config.load();
        if !config.enabled {
            return SendHandle::ready(skip(&fields));
        }

        let envelope = Envelope::stamp(fields);
        let http = self.http.clone();
        let (tx, rx) = oneshot::channel();

        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    let delivery = deliver(&http, &config, &envelope).await;
                    let _ = tx.send(delivery);
                });
            }
            Err(_) => {
                let spawned = thread::Builder::new()
                    .name("debug-dump-send".to_string())
                    .spawn(move || {
                        let delivery = deliver_on_own_runtime(&http, &config, &envelope);
                        let _ = tx.send(delivery);
                    });
                if let Err(e) = spawned {
                    tracing::debug!(error = %e, "Could not spawn send thread, envelope dropped");
                }
            }
        }

        SendHandle::pending(rx)
    }

    /// Send an envelope and block until the attempt finishes.
    ///
    /// The attempt runs on a dedicated thread, so this is safe to call from
    /// inside an async context.
    pub fn send_blocking(&self, fields: EnvelopeFields) -> Delivery {
        let config = self.config.load();
        if !config.enabled {
            return skip(&fields);
        }

        let envelope = Envelope::stamp(fields);
        let http = self.http.clone();
        let worker = thread::Builder::new()
            .name("debug-dump-flush".to_string())
            .spawn(move || deliver_on_own_runtime(&http, &config, &envelope));

        match worker {
            Ok(worker) => worker.join().unwrap_or(Delivery::Failed),
            Err(e) => {
                tracing::debug!(error = %e, "Could not spawn flush thread, envelope dropped");
                Delivery::Failed
            }
        }
    }
}

impl Default for DumpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DumpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn build_http_client() -> reqwest::Client {
    // Connections are not pooled: sends may run on different runtimes.
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

fn skip(fields: &EnvelopeFields) -> Delivery {
    tracing::trace!(kind = %fields.kind, "Debug dump disabled, envelope skipped");
    metrics::record_delivery(fields.kind, Delivery::Disabled);
    Delivery::Disabled
}

fn deliver_on_own_runtime(http: &reqwest::Client, config: &DumpConfig, envelope: &Envelope) -> Delivery {
    match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime.block_on(deliver(http, config, envelope)),
        Err(e) => {
            tracing::debug!(error = %e, "Could not start send runtime, envelope dropped");
            metrics::record_delivery(envelope.kind, Delivery::Failed);
            Delivery::Failed
        }
    }
}

/// Perform the single attempt and record its outcome.
async fn deliver(http: &reqwest::Client, config: &DumpConfig, envelope: &Envelope) -> Delivery {
    let delivery = match post_envelope(http, config, envelope).await {
        Ok(status) => {
            tracing::debug!(
                kind = %envelope.kind,
                host = %config.host,
                port = config.port,
                status = status.as_u16(),
                "Envelope delivered"
            );
            Delivery::Delivered {
                status: status.as_u16(),
            }
        }
        Err(e) => {
            tracing::debug!(
                kind = %envelope.kind,
                host = %config.host,
                port = config.port,
                error = %e,
                "Debug server unavailable, envelope dropped"
            );
            Delivery::Failed
        }
    };

    metrics::record_delivery(envelope.kind, delivery);
    delivery
}

async fn post_envelope(
    http: &reqwest::Client,
    config: &DumpConfig,
    envelope: &Envelope,
) -> Result<StatusCode, TransportError> {
    let endpoint = config.endpoint()?;
    let request = http.post(endpoint).json(envelope).send();

    // Dropping the future on timeout aborts the request.
    match timeout(SEND_TIMEOUT, request).await {
        Ok(response) => Ok(response?.status()),
        Err(_) => Err(TransportError::Timeout(SEND_TIMEOUT)),
    }
}
