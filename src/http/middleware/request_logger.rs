//! Request logging middleware.
//!
//! Emits one `request` envelope per completed response.
//!
//! ```no_run
//! use axum::{middleware, routing::get, Router};
//! use debug_dump::http::{request_logger, RequestLogger};
//!
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "ok" }))
//!     .layer(middleware::from_fn_with_state(RequestLogger::new(), request_logger));
//! ```

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::request::RequestSnapshot;
use crate::http::response::CompletionBody;
use crate::observability::metrics;
use crate::transport::DumpClient;

/// Largest request body buffered for the log.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// State for [`request_logger`].
#[derive(Clone, Debug)]
pub struct RequestLogger {
    client: DumpClient,
    max_body_bytes: usize,
}

impl RequestLogger {
    /// Log through the process-wide client.
    pub fn new() -> Self {
        Self::with_client(DumpClient::global().clone())
    }

    pub fn with_client(client: DumpClient) -> Self {
        Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware function; attach with `axum::middleware::from_fn_with_state`.
///
/// The request goes straight on to the next handler. The envelope is sent
/// when the response body finishes, carrying the elapsed time in ms.
pub async fn request_logger(
    State(logger): State<RequestLogger>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !logger.client.is_enabled() {
        return next.run(request).await;
    }

    let start = Instant::now();
    let (request, snapshot) = RequestSnapshot::capture(request, logger.max_body_bytes).await;

    let response = next.run(request).await;
    let status = response.status().as_u16();

    let client = logger.client;
    let (parts, body) = response.into_parts();
    let body = CompletionBody::new(body, move || {
        let elapsed = start.elapsed();
        metrics::record_request_observed(&snapshot.method, status, elapsed.as_secs_f64() * 1000.0);
        let _ = client.send(snapshot.into_fields(status, elapsed));
    });

    Response::from_parts(parts, Body::new(body))
}
