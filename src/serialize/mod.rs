//! Value serialization subsystem.
//!
//! # Data Flow
//! ```text
//! application value
//!     → value.rs (From conversions / named constructors → Value)
//!     → serializer.rs (dispatch per kind → serde_json::Value)
//!     → transport (envelope content)
//! ```
//!
//! # Design Decisions
//! - Total: unrepresentable values degrade to descriptive strings
//! - Non-JSON kinds become tagged wrappers carrying a `__type` field
//! - Cycles only exist through `SharedValue`; they render as `"[Circular]"`

pub mod serializer;
pub mod value;

pub use serializer::{serialize, BUFFER_PREVIEW_BYTES, CIRCULAR_MARKER};
pub use value::{SharedValue, Value};
