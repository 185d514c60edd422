//! Middleware plugged into the host application's axum router.

pub mod request_logger;

pub use request_logger::{request_logger, RequestLogger, DEFAULT_MAX_BODY_BYTES};
