//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (127.0.0.1:8765, enabled)
//!     → SharedConfig (ArcSwap, one per DumpClient)
//!
//! configure(ConfigUpdate)
//!     → merge set fields over the current snapshot
//!     → atomic swap of Arc<DumpConfig>
//!     → every later send reads the new snapshot
//!
//! Optional sources (never applied implicitly):
//!     loader.rs: TOML file, DEBUG_DUMP_* environment variables
//! ```
//!
//! # Design Decisions
//! - No validation: any host/port is accepted and failures surface as
//!   swallowed transport errors
//! - Updates replace the whole structure; readers never see a torn config

pub mod loader;
pub mod schema;
pub mod shared;

pub use loader::{load_config, ConfigError};
pub use schema::{ConfigUpdate, DumpConfig};
pub use shared::SharedConfig;
