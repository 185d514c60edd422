//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! transport / request logger produce:
//!     → tracing events (delivery outcome, skipped sends, body capture)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → whatever subscriber / recorder the host application installs
//!     → logging.rs installs a fmt subscriber for the CLI
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder itself
//! - Without a recorder the metric macros are no-ops

pub mod logging;
pub mod metrics;
