//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! EnvelopeFields (kind, content, label, location)
//!     → envelope.rs (stamp timestamp + origin tag)
//!     → client.rs (read config snapshot; skip when disabled)
//!     → spawned task: POST http://{host}:{port}/dump, 1s timeout
//!     → handle.rs (SendHandle resolves to a Delivery)
//! ```
//!
//! # Design Decisions
//! - Exactly one attempt per envelope; no retry, no buffering
//! - Failures are logged at debug level and otherwise invisible
//! - Response status and body are ignored

pub mod client;
pub mod envelope;
pub mod handle;

pub use client::{DumpClient, TransportError, SEND_TIMEOUT};
pub use envelope::{Envelope, EnvelopeFields, Kind, SourceLocation, ORIGIN_TAG};
pub use handle::{Delivery, SendHandle};
