//! Lenient JSON decoding for external payloads
//!
//! Every parse site supplies a typed default. Decode failures are logged and
//! the default is returned instead of an error.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a JSON value that may still be an encoded string.
///
/// - `Value::String` is parsed as JSON text
/// - objects and arrays are decoded directly
/// - anything else, or any decode failure, yields `default`
pub fn safe_parse_json<T: DeserializeOwned>(raw: Value, default: T) -> T {
    match raw {
        Value::String(text) => safe_parse_str(&text, default),
        value @ (Value::Object(_) | Value::Array(_)) => match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Falling back to default, payload did not match: {}", e);
                default
            }
        },
        other => {
            tracing::debug!("Falling back to default for non-JSON payload: {}", other);
            default
        }
    }
}

/// Parse JSON text, returning `default` when it is malformed.
pub fn safe_parse_str<T: DeserializeOwned>(text: &str, default: T) -> T {
    match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Falling back to default, malformed JSON: {}", e);
            default
        }
    }
}
