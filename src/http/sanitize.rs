//! Redaction of credentials before request data leaves the process.

use axum::http::HeaderMap;
use serde_json::{Map, Value as JsonValue};

/// Replacement for every redacted value.
pub const REDACTED: &str = "[REDACTED]";

/// Header names (case-insensitive, exact) whose values are redacted.
pub const SENSITIVE_HEADERS: [&str; 4] = ["authorization", "cookie", "x-api-key", "x-auth-token"];

/// Body key fragments (case-insensitive, substring) whose values are redacted.
pub const SENSITIVE_BODY_KEYS: [&str; 5] = ["password", "secret", "token", "api_key", "apikey"];

pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|sensitive| sensitive.eq_ignore_ascii_case(name))
}

pub fn is_sensitive_field(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_BODY_KEYS
        .iter()
        .any(|fragment| key.contains(fragment))
}

/// Render headers as a JSON object with sensitive values redacted.
///
/// Names come out lowercase, as `http` stores them. A header sent more than
/// once becomes an array of its values.
pub fn sanitize_headers(headers: &HeaderMap) -> Map<String, JsonValue> {
    let mut out = Map::with_capacity(headers.keys_len());
    for name in headers.keys() {
        let rendered = if is_sensitive_header(name.as_str()) {
            JsonValue::String(REDACTED.to_string())
        } else {
            let mut values: Vec<JsonValue> = headers
                .get_all(name)
                .iter()
                .map(|v| JsonValue::String(String::from_utf8_lossy(v.as_bytes()).into_owned()))
                .collect();
            if values.len() == 1 {
                values.remove(0)
            } else {
                JsonValue::Array(values)
            }
        };
        out.insert(name.as_str().to_string(), rendered);
    }
    out
}

/// Redact sensitive top-level fields of an object body.
///
/// Shallow: nested objects are left alone. Non-object bodies pass through.
pub fn sanitize_body(body: JsonValue) -> JsonValue {
    match body {
        JsonValue::Object(fields) => JsonValue::Object(
            fields
                .into_iter()
                .map(|(key, value)| {
                    if is_sensitive_field(&key) {
                        (key, JsonValue::String(REDACTED.to_string()))
                    } else {
                        (key, value)
                    }
                })
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE, USER_AGENT};
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_authorization_is_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8.0"));
        headers.insert("X-Api-Key", HeaderValue::from_static("k"));

        let out = sanitize_headers(&headers);
        assert_eq!(out["authorization"], "[REDACTED]");
        assert_eq!(out["x-api-key"], "[REDACTED]");
        assert_eq!(out["user-agent"], "curl/8.0");
    }

    #[test]
    fn test_repeated_headers_become_arrays() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        headers.append(COOKIE, HeaderValue::from_static("session=abc"));
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));

        let out = sanitize_headers(&headers);
        assert_eq!(out["set-cookie"], json!(["a=1", "b=2"]));
        assert_eq!(out["cookie"], "[REDACTED]");
    }

    #[test]
    fn test_body_fields_are_redacted() {
        assert_eq!(
            sanitize_body(json!({ "password": "p", "name": "n" })),
            json!({ "password": "[REDACTED]", "name": "n" })
        );
        assert_eq!(
            sanitize_body(json!({
                "newPassword": "x",
                "client_secret": "y",
                "refreshToken": "z",
                "API_KEY": 1,
                "apiKeyId": 2,
                "email": "e",
            })),
            json!({
                "newPassword": "[REDACTED]",
                "client_secret": "[REDACTED]",
                "refreshToken": "[REDACTED]",
                "API_KEY": "[REDACTED]",
                "apiKeyId": "[REDACTED]",
                "email": "e",
            })
        );
    }

    #[test]
    fn test_body_redaction_is_shallow() {
        let body = json!({ "user": { "password": "p" }, "token": { "nested": true } });
        assert_eq!(
            sanitize_body(body),
            json!({ "user": { "password": "p" }, "token": "[REDACTED]" })
        );
    }

    #[test]
    fn test_non_object_bodies_pass_through() {
        assert_eq!(sanitize_body(json!("password=p")), json!("password=p"));
        assert_eq!(sanitize_body(json!([{ "password": "p" }])), json!([{ "password": "p" }]));
        assert_eq!(sanitize_body(JsonValue::Null), JsonValue::Null);
    }
}
