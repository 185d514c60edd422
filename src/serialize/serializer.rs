//! Rendering of [`Value`] into a JSON-safe tree.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Number, Value as JsonValue};

use crate::serialize::value::{SharedValue, Value};

/// Number of leading bytes of a buffer rendered in its hex preview.
pub const BUFFER_PREVIEW_BYTES: usize = 100;

/// Marker substituted for a shared node that reappears on its own path.
pub const CIRCULAR_MARKER: &str = "[Circular]";

const UNAVAILABLE_MARKER: &str = "[Unavailable]";

/// Render `value` as a JSON-safe tree.
///
/// Never fails: kinds JSON cannot carry become tagged wrappers
/// (`{"__type": ...}`) or descriptive strings.
pub fn serialize(value: &Value) -> JsonValue {
    Serializer::default().visit(value)
}

/// Format a timestamp the way the debug server expects
/// (`2024-01-02T03:04:05.678Z`).
pub fn iso8601(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Default)]
struct Serializer {
    /// Shared nodes currently being rendered, root first.
    path: Vec<usize>,
}

impl Serializer {
    fn visit(&mut self, value: &Value) -> JsonValue {
        match value {
            Value::Null => JsonValue::Null,
            Value::Function { name } => JsonValue::String(format!(
                "[Function: {}]",
                name.as_deref().unwrap_or("anonymous")
            )),
            Value::Symbol(description) => JsonValue::String(format!("Symbol({description})")),
            Value::BigInt(digits) => JsonValue::String(format!("{digits}n")),
            Value::Error {
                name,
                message,
                stack,
            } => json!({
                "__type": "Error",
                "name": name,
                "message": message,
                "stack": stack_lines(stack.as_deref()),
            }),
            Value::Date(t) => json!({
                "__type": "Date",
                "value": iso8601(t),
            }),
            Value::Map(entries) => {
                let entries: Vec<JsonValue> = entries
                    .iter()
                    .map(|(k, v)| JsonValue::Array(vec![self.visit(k), self.visit(v)]))
                    .collect();
                json!({
                    "__type": "Map",
                    "entries": entries,
                })
            }
            Value::Set(members) => {
                let values: Vec<JsonValue> = members.iter().map(|m| self.visit(m)).collect();
                json!({
                    "__type": "Set",
                    "values": values,
                })
            }
            Value::Buffer(bytes) => {
                let preview = &bytes[..bytes.len().min(BUFFER_PREVIEW_BYTES)];
                json!({
                    "__type": "Buffer",
                    "length": bytes.len(),
                    "preview": hex::encode(preview),
                })
            }
            Value::Array(items) => JsonValue::Array(items.iter().map(|i| self.visit(i)).collect()),
            Value::Object(fields) => {
                let mut map = Map::with_capacity(fields.len());
                for (key, field) in fields {
                    let rendered = self.visit(field);
                    map.insert(key.clone(), rendered);
                }
                JsonValue::Object(map)
            }
            Value::Shared(node) => self.visit_shared(node),
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(n) => JsonValue::from(*n),
            Value::UInt(n) => JsonValue::from(*n),
            Value::Float(n) => float(*n),
            Value::String(s) => JsonValue::String(s.clone()),
        }
    }

    fn visit_shared(&mut self, node: &SharedValue) -> JsonValue {
        let id = node.id();
        if self.path.contains(&id) {
            return JsonValue::String(CIRCULAR_MARKER.to_string());
        }
        let Some(guard) = node.read() else {
            return JsonValue::String(UNAVAILABLE_MARKER.to_string());
        };

        self.path.push(id);
        let rendered = self.visit(&guard);
        self.path.pop();
        rendered
    }
}

fn float(n: f64) -> JsonValue {
    match Number::from_f64(n) {
        Some(number) => JsonValue::Number(number),
        None if n.is_nan() => JsonValue::String("NaN".to_string()),
        None if n > 0.0 => JsonValue::String("Infinity".to_string()),
        None => JsonValue::String("-Infinity".to_string()),
    }
}

fn stack_lines(stack: Option<&str>) -> Vec<String> {
    stack
        .map(|s| {
            s.split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
                .collect()
        })
        .unwrap_or_default()
}
