//! Debug dump client.
//!
//! Serializes runtime values into a JSON-safe form and forwards them to a
//! local debug-visualization server. Every send is best-effort: if the server
//! is absent nothing happens and the application carries on.
//!
//! ```no_run
//! use debug_dump::{dump, log_warning, ConfigUpdate, Value};
//!
//! debug_dump::configure(ConfigUpdate::new().port(9999));
//! dump(Value::object([("user_id", 7)]));
//! log_warning("cache miss", None);
//! ```

// Core subsystems
pub mod config;
pub mod serialize;
pub mod transport;

// Application-facing surface
pub mod entry;
pub mod http;

// Cross-cutting concerns
pub mod observability;

pub use config::{ConfigUpdate, DumpConfig};
pub use entry::{
    config, configure, dd, dd_labeled, dump, dump_labeled, is_enabled, log_error, log_query,
    log_warning, Thrown,
};
pub use http::{request_logger, RequestLogger};
pub use serialize::{serialize, SharedValue, Value};
pub use transport::{Delivery, DumpClient, SendHandle};
