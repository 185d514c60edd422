//! Wire envelope sent to the debug server.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::serialize::serializer::iso8601;

/// Origin tag identifying this runtime to a multi-language debug server.
pub const ORIGIN_TAG: &str = "rust";

/// Envelope kind, serialized as the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// A plain value dump.
    Dump,
    Error,
    Warning,
    Query,
    Request,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Dump => "dump",
            Kind::Error => "error",
            Kind::Warning => "warning",
            Kind::Query => "query",
            Kind::Request => "request",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call site that produced an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Caller-supplied envelope fields, before stamping.
#[derive(Debug, Clone)]
pub struct EnvelopeFields {
    pub kind: Kind,
    pub content: JsonValue,
    pub label: Option<String>,
    pub location: Option<SourceLocation>,
}

impl EnvelopeFields {
    pub fn new(kind: Kind, content: JsonValue) -> Self {
        Self {
            kind,
            content,
            label: None,
            location: None,
        }
    }

    pub fn label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }
}

/// The JSON object POSTed to `/dump`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: Kind,

    pub content: JsonValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,

    /// ISO-8601 UTC, millisecond precision.
    pub timestamp: String,

    pub language: String,
}

impl Envelope {
    /// Stamp `fields` with the current time and the origin tag.
    pub fn stamp(fields: EnvelopeFields) -> Self {
        Self::stamp_at(fields, Utc::now())
    }

    pub fn stamp_at(fields: EnvelopeFields, now: DateTime<Utc>) -> Self {
        let (file, line, column) = match fields.location {
            Some(loc) => (Some(loc.file), Some(loc.line), Some(loc.column)),
            None => (None, None, None),
        };

        Self {
            kind: fields.kind,
            content: fields.content,
            label: fields.label,
            file,
            line,
            column,
            timestamp: iso8601(&now),
            language: ORIGIN_TAG.to_string(),
        }
    }
}
