//! Dynamic values accepted by the serializer.
//!
//! Rust has no runtime "any" value, so callers build a [`Value`] either through
//! the `From` conversions below or through the named constructors for kinds
//! that have no native Rust counterpart (functions, symbols, errors).

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::time::SystemTime;

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// A runtime value to be rendered for the debug server.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    /// A callable. `None` renders as anonymous.
    Function { name: Option<String> },
    /// A unique token known only by its description.
    Symbol(String),
    /// Decimal digits of an integer that does not fit in 64 bits.
    BigInt(String),
    Error {
        name: String,
        message: String,
        stack: Option<String>,
    },
    Date(DateTime<Utc>),
    /// Key/value pairs with arbitrary keys, in insertion order.
    Map(Vec<(Value, Value)>),
    /// Distinct members in insertion order.
    Set(Vec<Value>),
    Buffer(Bytes),
    Array(Vec<Value>),
    /// String-keyed fields in insertion order.
    Object(Vec<(String, Value)>),
    Shared(SharedValue),
}

impl Value {
    /// Build an object from `(key, value)` pairs, keeping their order.
    pub fn object<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn array<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Build a map structure from `(key, value)` pairs, keeping their order.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a set structure. Members are expected to be distinct.
    pub fn set<V: Into<Value>>(members: impl IntoIterator<Item = V>) -> Self {
        Value::Set(members.into_iter().map(Into::into).collect())
    }

    pub fn buffer(bytes: impl Into<Bytes>) -> Self {
        Value::Buffer(bytes.into())
    }

    /// A named callable. An empty name is treated as anonymous.
    pub fn function(name: impl Into<String>) -> Self {
        let name = name.into();
        Value::Function {
            name: (!name.is_empty()).then_some(name),
        }
    }

    pub fn anonymous_function() -> Self {
        Value::Function { name: None }
    }

    /// Describe a callable by its type. Closures and function pointers carry
    /// no usable name and render as anonymous.
    pub fn function_of<F: ?Sized>(_callable: &F) -> Self {
        Value::Function {
            name: short_type_name(std::any::type_name::<F>()),
        }
    }

    pub fn symbol(description: impl Into<String>) -> Self {
        Value::Symbol(description.into())
    }

    /// Capture an error's type name, message, and `source()` chain.
    pub fn error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        let (name, message, stack) = describe_error(err);
        Value::Error {
            name,
            message,
            stack: Some(stack),
        }
    }

    /// Convert any serde-serializable value. Serialization failures degrade to
    /// a descriptive string instead of failing.
    pub fn serde<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => json.into(),
            Err(e) => Value::String(format!("[Unserializable: {e}]")),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// A reference-counted node that can be shared between several parents,
/// including itself.
///
/// This is the only way to build a cyclic value graph; the serializer marks a
/// node that reappears on its own path as `"[Circular]"`.
#[derive(Clone, Default)]
pub struct SharedValue(Arc<RwLock<Value>>);

impl SharedValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Arc::new(RwLock::new(value.into())))
    }

    /// Replace the node's content.
    pub fn set(&self, value: impl Into<Value>) {
        let value = value.into();
        match self.0.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    /// Mutate the node's content in place.
    pub fn update(&self, f: impl FnOnce(&mut Value)) {
        match self.0.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub(crate) fn read(&self) -> Option<RwLockReadGuard<'_, Value>> {
        self.0.read().ok()
    }
}

// Content is not printed: the node may contain itself.
impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedValue({:#x})", self.id())
    }
}

/// Split an error into `(name, message, stack)`.
///
/// The stack starts with `"<name>: <message>"` and lists each `source()` on
/// its own `caused by:` line.
pub(crate) fn describe_error<E: std::error::Error + ?Sized>(err: &E) -> (String, String, String) {
    let name =
        short_type_name(std::any::type_name::<E>()).unwrap_or_else(|| "Error".to_string());
    let message = err.to_string();

    let mut stack = format!("{name}: {message}");
    let mut source = err.source();
    while let Some(cause) = source {
        stack.push_str("\n    caused by: ");
        stack.push_str(&cause.to_string());
        source = cause.source();
    }

    (name, message, stack)
}

/// Last path segment of a type name, without generics.
///
/// Returns `None` for closures and function pointers.
pub(crate) fn short_type_name(full: &str) -> Option<String> {
    if full.contains("{{closure}}") || full.starts_with("fn(") {
        return None;
    }
    let full = full.trim_start_matches('&').trim_start_matches("dyn ");
    let base = full.split('<').next().unwrap_or(full);
    let base = base.split(" + ").next().unwrap_or(base);
    base.rsplit("::")
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Int(n as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::UInt(n as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::BigInt(n.to_string())
    }
}

impl From<u128> for Value {
    fn from(n: u128) -> Self {
        Value::BigInt(n.to_string())
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::String(c.to_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(s: Cow<'_, str>) -> Self {
        Value::String(s.into_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::array(items.iter().cloned())
    }
}

impl<K: Into<Value>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(map: HashMap<K, V, S>) -> Self {
        Value::map(map)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Value::map(map)
    }
}

impl<T: Into<Value>, S> From<HashSet<T, S>> for Value {
    fn from(set: HashSet<T, S>) -> Self {
        Value::set(set)
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(set: BTreeSet<T>) -> Self {
        Value::set(set)
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Buffer(bytes)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(t: DateTime<Tz>) -> Self {
        Value::Date(t.with_timezone(&Utc))
    }
}

impl From<SystemTime> for Value {
    fn from(t: SystemTime) -> Self {
        Value::Date(DateTime::<Utc>::from(t))
    }
}

impl From<SharedValue> for Value {
    fn from(node: SharedValue) -> Self {
        Value::Shared(node)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::array(items),
            Json::Object(fields) => fields.into(),
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Value {
    fn from(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Value::object(fields)
    }
}
