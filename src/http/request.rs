//! Request capture for the request logger.
//!
//! # Responsibilities
//! - Snapshot method, URL, path, headers, query, body and client address
//! - Buffer small JSON/text/form bodies and hand them back untouched
//! - Apply redaction before anything is stored

use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::ConnectInfo;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request};
use http_body::{Body as HttpBody, Frame};
use serde_json::{json, Map, Value as JsonValue};

use crate::http::sanitize::{sanitize_body, sanitize_headers};
use crate::transport::{EnvelopeFields, Kind};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// What the logger knows about a request before the handler runs.
#[derive(Debug, Clone)]
pub(crate) struct RequestSnapshot {
    pub(crate) method: String,
    url: String,
    path: String,
    headers: Map<String, JsonValue>,
    query: Map<String, JsonValue>,
    body: JsonValue,
    ip: Option<String>,
}

impl RequestSnapshot {
    /// Snapshot `request`, returning it ready to be forwarded.
    pub(crate) async fn capture(request: Request<Body>, max_body_bytes: usize) -> (Request<Body>, Self) {
        let (parts, body) = request.into_parts();
        let (body, captured) = capture_body(&parts.headers, body, max_body_bytes).await;

        let snapshot = Self {
            method: parts.method.as_str().to_string(),
            url: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| parts.uri.path().to_string()),
            path: parts.uri.path().to_string(),
            headers: sanitize_headers(&parts.headers),
            query: parse_pairs(parts.uri.query().unwrap_or_default().as_bytes()),
            body: sanitize_body(captured),
            ip: client_ip(&parts),
        };

        (Request::from_parts(parts, body), snapshot)
    }

    /// Complete the snapshot with the response outcome.
    pub(crate) fn into_fields(self, status: u16, duration: Duration) -> EnvelopeFields {
        let content = json!({
            "method": self.method,
            "url": self.url,
            "path": self.path,
            "statusCode": status,
            "duration": duration.as_millis() as u64,
            "headers": self.headers,
            "query": self.query,
            "body": self.body,
            "ip": self.ip,
        });
        EnvelopeFields::new(Kind::Request, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Text,
}

fn body_kind(headers: &HeaderMap) -> Option<BodyKind> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == "application/json" || essence.ends_with("+json") {
        Some(BodyKind::Json)
    } else if essence == "application/x-www-form-urlencoded" {
        Some(BodyKind::Form)
    } else if essence.starts_with("text/") {
        Some(BodyKind::Text)
    } else {
        None
    }
}

/// Buffer the body when it is small, declared, and readable.
///
/// Returns the body to forward and its decoded form (`null` when skipped).
async fn capture_body(headers: &HeaderMap, body: Body, limit: usize) -> (Body, JsonValue) {
    let Some(kind) = body_kind(headers) else {
        return (body, JsonValue::Null);
    };

    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<usize>().ok());
    match declared {
        Some(len) if len > 0 && len <= limit => {}
        _ => return (body, JsonValue::Null),
    }

    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => {
            let decoded = decode_body(kind, &bytes);
            (Body::from(bytes), decoded)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Request body could not be buffered for logging");
            (Body::new(FailedBody::new(e)), JsonValue::Null)
        }
    }
}

/// Body that replays a read error to the downstream handler.
struct FailedBody {
    error: Option<axum::Error>,
}

impl FailedBody {
    fn new(error: axum::Error) -> Self {
        Self { error: Some(error) }
    }
}

impl HttpBody for FailedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.error.take().map(Err))
    }

    fn is_end_stream(&self) -> bool {
        self.error.is_none()
    }
}

fn decode_body(kind: BodyKind, bytes: &[u8]) -> JsonValue {
    match kind {
        BodyKind::Json => serde_json::from_slice(bytes)
            .unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(bytes).into_owned())),
        BodyKind::Form => JsonValue::Object(parse_pairs(bytes)),
        BodyKind::Text => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Decode `a=1&b=2&b=3` into `{"a": "1", "b": ["2", "3"]}`.
fn parse_pairs(raw: &[u8]) -> Map<String, JsonValue> {
    let mut out = Map::new();
    for (key, value) in url::form_urlencoded::parse(raw) {
        let value = JsonValue::String(value.into_owned());
        match out.get_mut(&*key) {
            Some(JsonValue::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = JsonValue::Array(vec![first, value]);
            }
            None => {
                out.insert(key.into_owned(), value);
            }
        }
    }
    out
}

fn client_ip(parts: &Parts) -> Option<String> {
    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        return Some(addr.ip().to_string());
    }

    parts
        .headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}
