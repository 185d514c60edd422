//! Values accepted by `log_error`.

use std::fmt;

use crate::serialize::value::{describe_error, Value};

/// Either a proper error or any other value that was raised as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thrown {
    Error {
        name: String,
        message: String,
        stack: String,
    },
    Other(String),
}

impl Thrown {
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        let (name, message, stack) = describe_error(err);
        Thrown::Error {
            name,
            message,
            stack,
        }
    }

    /// Wrap a non-error value by its display form.
    pub fn other(value: impl fmt::Display) -> Self {
        Thrown::Other(value.to_string())
    }

    /// Envelope label: the error's name, or `"Error"`.
    pub fn label(&self) -> &str {
        match self {
            Thrown::Error { name, .. } => name,
            Thrown::Other(_) => "Error",
        }
    }

    /// `{name, message, stack}` for errors, `{message}` otherwise.
    pub fn content(&self) -> Value {
        match self {
            Thrown::Error {
                name,
                message,
                stack,
            } => Value::object([
                ("name", name.as_str()),
                ("message", message.as_str()),
                ("stack", stack.as_str()),
            ]),
            Thrown::Other(message) => Value::object([("message", message.as_str())]),
        }
    }
}

impl From<&str> for Thrown {
    fn from(message: &str) -> Self {
        Thrown::Other(message.to_string())
    }
}

impl From<String> for Thrown {
    fn from(message: String) -> Self {
        Thrown::Other(message)
    }
}

impl From<std::io::Error> for Thrown {
    fn from(err: std::io::Error) -> Self {
        Thrown::from_error(&err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Thrown {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Thrown::from_error(err.as_ref())
    }
}
