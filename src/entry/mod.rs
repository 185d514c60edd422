//! Entry points used by application code.
//!
//! # Data Flow
//! ```text
//! dump / log_error / log_warning / log_query / dd
//!     → location.rs (resolve #[track_caller] call site)
//!     → serialize (content)
//!     → DumpClient::send (fire-and-forget)
//!       or DumpClient::send_blocking + exit (dd)
//! ```
//!
//! Every method exists on [`DumpClient`] and as a free function on the
//! process-wide client.

pub mod location;
pub mod thrown;

use std::panic::Location;
use std::time::Duration;

use serde_json::Value as JsonValue;

use crate::config::{ConfigUpdate, DumpConfig};
use crate::serialize::{serialize, Value};
use crate::transport::{DumpClient, EnvelopeFields, Kind, SendHandle};

pub use location::{CallerLocator, NoLocation, TrackCaller};
pub use thrown::Thrown;

/// Label attached to `dd` dumps when the caller gives none.
pub const DD_LABEL: &str = "dd";

/// Exit status used by `dd`.
pub const DD_EXIT_CODE: i32 = 1;

impl DumpClient {
    /// Dump a value.
    #[track_caller]
    pub fn dump(&self, value: impl Into<Value>) -> SendHandle {
        self.emit(Kind::Dump, serialize(&value.into()), None, Location::caller())
    }

    #[track_caller]
    pub fn dump_labeled(&self, value: impl Into<Value>, label: impl Into<String>) -> SendHandle {
        self.emit(
            Kind::Dump,
            serialize(&value.into()),
            Some(label.into()),
            Location::caller(),
        )
    }

    /// Dump a value, wait for the send attempt, then exit the process.
    #[track_caller]
    pub fn dd(&self, value: impl Into<Value>) -> ! {
        self.terminate(value.into(), DD_LABEL.to_string(), Location::caller())
    }

    #[track_caller]
    pub fn dd_labeled(&self, value: impl Into<Value>, label: impl Into<String>) -> ! {
        self.terminate(value.into(), label.into(), Location::caller())
    }

    /// Report an error, or any value raised as one.
    #[track_caller]
    pub fn log_error(&self, thrown: impl Into<Thrown>) -> SendHandle {
        let thrown = thrown.into();
        self.emit(
            Kind::Error,
            serialize(&thrown.content()),
            Some(thrown.label().to_string()),
            Location::caller(),
        )
    }

    #[track_caller]
    pub fn log_warning(&self, message: impl Into<String>, context: Option<Value>) -> SendHandle {
        self.emit(
            Kind::Warning,
            serialize(&warning_content(message.into(), context)),
            None,
            Location::caller(),
        )
    }

    /// Report a database query. `duration` is sent in milliseconds.
    #[track_caller]
    pub fn log_query(
        &self,
        sql: impl Into<String>,
        bindings: Vec<Value>,
        duration: Option<Duration>,
    ) -> SendHandle {
        self.emit(
            Kind::Query,
            serialize(&query_content(sql.into(), bindings, duration)),
            None,
            Location::caller(),
        )
    }

    fn emit(
        &self,
        kind: Kind,
        content: JsonValue,
        label: Option<String>,
        caller: &'static Location<'static>,
    ) -> SendHandle {
        self.send(
            EnvelopeFields::new(kind, content)
                .label(label)
                .location(self.locate(caller)),
        )
    }

    fn terminate(&self, value: Value, label: String, caller: &'static Location<'static>) -> ! {
        let fields = EnvelopeFields::new(Kind::Dump, serialize(&value))
            .label(Some(label))
            .location(self.locate(caller));
        let delivery = self.send_blocking(fields);
        tracing::debug!(?delivery, "dd: exiting");
        std::process::exit(DD_EXIT_CODE)
    }
}

fn warning_content(message: String, context: Option<Value>) -> Value {
    let mut fields = vec![("message".to_string(), Value::String(message))];
    if let Some(context) = context {
        fields.push(("context".to_string(), context));
    }
    Value::Object(fields)
}

fn query_content(sql: String, bindings: Vec<Value>, duration: Option<Duration>) -> Value {
    Value::object([
        ("sql", Value::String(sql)),
        ("bindings", Value::Array(bindings)),
        (
            "duration",
            duration.map_or(Value::Null, |d| Value::Float(d.as_nanos() as f64 / 1_000_000.0)),
        ),
    ])
}

/// Dump a value through the process-wide client.
#[track_caller]
pub fn dump(value: impl Into<Value>) -> SendHandle {
    DumpClient::global().dump(value)
}

#[track_caller]
pub fn dump_labeled(value: impl Into<Value>, label: impl Into<String>) -> SendHandle {
    DumpClient::global().dump_labeled(value, label)
}

/// Dump a value, wait for the send attempt, then exit with status 1.
#[track_caller]
pub fn dd(value: impl Into<Value>) -> ! {
    DumpClient::global().dd(value)
}

#[track_caller]
pub fn dd_labeled(value: impl Into<Value>, label: impl Into<String>) -> ! {
    DumpClient::global().dd_labeled(value, label)
}

#[track_caller]
pub fn log_error(thrown: impl Into<Thrown>) -> SendHandle {
    DumpClient::global().log_error(thrown)
}

#[track_caller]
pub fn log_warning(message: impl Into<String>, context: Option<Value>) -> SendHandle {
    DumpClient::global().log_warning(message, context)
}

#[track_caller]
pub fn log_query(
    sql: impl Into<String>,
    bindings: Vec<Value>,
    duration: Option<Duration>,
) -> SendHandle {
    DumpClient::global().log_query(sql, bindings, duration)
}

/// Merge `update` over the process-wide configuration.
pub fn configure(update: ConfigUpdate) {
    DumpClient::global().configure(update);
}

pub fn is_enabled() -> bool {
    DumpClient::global().is_enabled()
}

pub fn config() -> std::sync::Arc<DumpConfig> {
    DumpClient::global().config()
}
