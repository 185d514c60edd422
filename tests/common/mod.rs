//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use debug_dump::DumpConfig;
use serde_json::Value;
use tokio::net::TcpListener;

/// A request as seen by the mock debug server.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct ReceivedRequest {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Value,
}

type Received = Arc<Mutex<Vec<ReceivedRequest>>>;

/// A debug server stand-in that records every request it gets.
pub struct MockDumpServer {
    pub addr: SocketAddr,
    received: Received,
}

#[allow(dead_code)]
impl MockDumpServer {
    pub async fn start(addr: SocketAddr) -> Self {
        let listener = TcpListener::bind(addr).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received: Received = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new().fallback(record).with_state(received.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, received }
    }

    /// Start on an ephemeral localhost port.
    pub async fn start_local() -> Self {
        Self::start("127.0.0.1:0".parse().unwrap()).await
    }

    /// Client configuration pointing at this server.
    pub fn config(&self) -> DumpConfig {
        DumpConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            enabled: true,
        }
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().unwrap().clone()
    }

    /// Poll until at least `count` requests arrived or `within` elapsed.
    pub async fn wait_for(&self, count: usize, within: Duration) -> Vec<ReceivedRequest> {
        let deadline = Instant::now() + within;
        loop {
            let received = self.received();
            if received.len() >= count || Instant::now() >= deadline {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn record(
    State(received): State<Received>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let request = ReceivedRequest {
        method,
        path: uri.path().to_string(),
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    received.lock().unwrap().push(request);
    StatusCode::OK
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Accept connections and never answer.
#[allow(dead_code)]
pub async fn start_silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}
