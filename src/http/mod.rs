//! HTTP framework adapter.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → middleware/request_logger.rs (start timer)
//!     → request.rs (snapshot, buffer small bodies, redact)
//!     → next handler (runs immediately)
//!     → response.rs (wrap body; fires when the body finishes)
//!     → DumpClient::send (request envelope, fire-and-forget)
//! ```
//!
//! # Design Decisions
//! - Redaction happens before the snapshot is stored
//! - The request and response reach the application unchanged

pub mod middleware;
pub mod request;
pub mod response;
pub mod sanitize;

pub use middleware::{request_logger, RequestLogger, DEFAULT_MAX_BODY_BYTES};
pub use sanitize::{sanitize_body, sanitize_headers, REDACTED};
