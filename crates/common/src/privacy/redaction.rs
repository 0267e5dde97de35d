//! Key-based credential redaction for JSON contexts

use serde_json::{Map, Value};

/// Lowercased fragments that mark a key as carrying a credential.
pub const SENSITIVE_KEY_FRAGMENTS: &[&str] =
    &["token", "access_token", "password", "secret", "key", "auth"];

/// Replacement for short or non-string sensitive values.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// Values at or below this many characters are fully replaced.
const MASK_MIN_CHARS: usize = 8;
const MASK_EDGE_CHARS: usize = 4;

/// Returns true when `key` (case-insensitive) contains a sensitive fragment.
pub fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    SENSITIVE_KEY_FRAGMENTS.iter().any(|fragment| lowered.contains(fragment))
}

/// Mask a sensitive value.
///
/// Strings longer than 8 characters keep their first and last four characters
/// (`abcd…1234`); anything else becomes [`REDACTED_PLACEHOLDER`].
pub fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > MASK_MIN_CHARS => {
            let head: String = s.chars().take(MASK_EDGE_CHARS).collect();
            let tail: String = {
                let mut rev: Vec<char> = s.chars().rev().take(MASK_EDGE_CHARS).collect();
                rev.reverse();
                rev.into_iter().collect()
            };
            Value::String(format!("{head}…{tail}"))
        }
        _ => Value::String(REDACTED_PLACEHOLDER.to_string()),
    }
}

/// Return a copy of `context` with every sensitive key masked.
///
/// Nested objects are walked recursively. Arrays are copied as-is.
pub fn sanitize(context: &Value) -> Value {
    match context {
        Value::Object(map) => Value::Object(sanitize_map(map)),
        other => other.clone(),
    }
}

fn sanitize_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let cleaned = if is_sensitive_key(key) {
                mask_value(value)
            } else if let Value::Object(inner) = value {
                Value::Object(sanitize_map(inner))
            } else {
                value.clone()
            };
            (key.clone(), cleaned)
        })
        .collect()
}
