//! Request logging middleware driven through an axum router.

use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{rejection::StringRejection, ConnectInfo},
    http::{header, Request, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use debug_dump::transport::{Envelope, Kind};
use debug_dump::{request_logger, DumpClient, DumpConfig, RequestLogger};
use http_body::Frame;
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::MockDumpServer;

fn app(config: DumpConfig) -> Router {
    let logger = RequestLogger::with_client(DumpClient::with_config(config));
    Router::new()
        .route("/users/{id}", post(|body: String| async move { body }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/upload", post(upload))
        .layer(middleware::from_fn_with_state(logger, request_logger))
}

async fn upload(body: Result<String, StringRejection>) -> (StatusCode, String) {
    match body {
        Ok(body) => (StatusCode::OK, body),
        Err(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
    }
}

/// Upload that sends part of its body and then breaks.
struct BrokenUpload {
    sent: bool,
}

impl http_body::Body for BrokenUpload {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        if self.sent {
            return Poll::Ready(Some(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            ))));
        }
        self.sent = true;
        Poll::Ready(Some(Ok(Frame::data(Bytes::from_static(b"{\"a\":")))))
    }
}

fn broken_upload_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, 10)
        .body(Body::new(BrokenUpload { sent: false }))
        .unwrap()
}

fn login_request() -> Request<Body> {
    let body = r#"{"user":"ann","password":"hunter2","nested":{"token":"kept"}}"#;
    let mut request = Request::builder()
        .method("POST")
        .uri("/users/7?tag=a&tag=b&page=2")
        .header(header::AUTHORIZATION, "Bearer abc")
        .header(header::COOKIE, "session=1")
        .header("x-request-id", "req-1")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo("192.0.2.10:41000".parse::<SocketAddr>().unwrap()));
    request
}

#[tokio::test]
async fn test_logs_sanitized_request_after_response() {
    let server = MockDumpServer::start_local().await;
    let app = app(server.config());

    let response = app.oneshot(login_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Nothing is sent while the response body is still pending.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(server.received().is_empty());

    let echoed = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        &echoed[..],
        br#"{"user":"ann","password":"hunter2","nested":{"token":"kept"}}"#
    );

    let received = server.wait_for(1, Duration::from_secs(2)).await;
    assert_eq!(received.len(), 1);
    let envelope: Envelope = serde_json::from_value(received[0].body.clone()).unwrap();
    assert_eq!(envelope.kind, Kind::Request);
    assert_eq!(envelope.label, None);
    assert_eq!(envelope.file, None);

    let content = &envelope.content;
    assert_eq!(content["method"], "POST");
    assert_eq!(content["url"], "/users/7?tag=a&tag=b&page=2");
    assert_eq!(content["path"], "/users/7");
    assert_eq!(content["statusCode"], 200);
    assert!(content["duration"].is_u64());
    assert_eq!(content["ip"], "192.0.2.10");
    assert_eq!(content["query"], json!({ "tag": ["a", "b"], "page": "2" }));

    assert_eq!(content["headers"]["authorization"], "[REDACTED]");
    assert_eq!(content["headers"]["cookie"], "[REDACTED]");
    assert_eq!(content["headers"]["x-request-id"], "req-1");
    assert_eq!(content["headers"]["content-type"], "application/json");

    // Only top-level keys are redacted.
    assert_eq!(
        content["body"],
        json!({ "user": "ann", "password": "[REDACTED]", "nested": { "token": "kept" } })
    );
}

#[tokio::test]
async fn test_dropped_response_still_logs() {
    let server = MockDumpServer::start_local().await;
    let app = app(server.config());

    let request = Request::builder()
        .uri("/missing")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    drop(response);

    let received = server.wait_for(1, Duration::from_secs(2)).await;
    assert_eq!(received.len(), 1);
    let content = &received[0].body["content"];
    assert_eq!(content["statusCode"], 404);
    assert_eq!(content["method"], "GET");
    assert_eq!(content["body"], json!(null));
    assert_eq!(content["ip"], json!(null));
    assert_eq!(content["query"], json!({}));
}

#[tokio::test]
async fn test_disabled_logger_passes_through() {
    let server = MockDumpServer::start_local().await;
    let app = app(DumpConfig {
        enabled: false,
        ..server.config()
    });

    let response = app.oneshot(login_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let echoed = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(!echoed.is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(server.received().is_empty());
}

#[tokio::test]
async fn test_unreachable_server_does_not_affect_response() {
    let addr = common::closed_port().await;
    let app = app(DumpConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        enabled: true,
    });

    let response = app.oneshot(login_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let echoed = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(echoed.starts_with(b"{\"user\""));
}

#[tokio::test]
async fn test_broken_upload_reaches_handler_as_error() {
    let server = MockDumpServer::start_local().await;

    let response = app(server.config())
        .oneshot(broken_upload_request())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&text);
    assert!(text.contains("Failed to buffer"), "{text}");

    // Same outcome as without the logger.
    let response = app(DumpConfig {
        enabled: false,
        ..server.config()
    })
    .oneshot(broken_upload_request())
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let received = server.wait_for(1, Duration::from_secs(2)).await;
    assert_eq!(received.len(), 1);
    let content = &received[0].body["content"];
    assert_eq!(content["path"], "/upload");
    assert_eq!(content["statusCode"], 400);
    assert_eq!(content["body"], json!(null));
}
