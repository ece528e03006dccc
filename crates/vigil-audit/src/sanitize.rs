// SPDX-License-Identifier: PMPL-1.0-or-later
//! Redaction pass applied to audit payloads before persistence.
//!
//! Pure and deterministic: a structurally identical deep copy of the input
//! in which every map value under a sensitive key is replaced by the
//! [`REDACTED`] marker. Matching is a case-insensitive substring test, so
//! composed keys such as `userPasswordHash` or `stripe_api_key` are caught.

use serde_json::Value;

/// Marker written in place of a sensitive value.
pub const REDACTED: &str = "***REDACTED***";

/// Key fragments that mark a map entry as sensitive.
const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "password",
    "passwordhash",
    "secret",
    "apikey",
    "token",
    "accesstoken",
    "refreshtoken",
    "privatekey",
    "creditcard",
    "cvv",
    "pin",
];

/// Whether a map key names a value that must not be persisted.
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEY_FRAGMENTS
        .iter()
        .any(|fragment| key.contains(fragment))
}

/// Produce a redacted deep copy of an arbitrary JSON-like value.
///
/// Scalars and nulls pass through unchanged; lists and maps are walked at
/// arbitrary depth. The input is never mutated, and re-running the pass on
/// its own output is a fixed point.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, nested)| {
                    let sanitized = if is_sensitive_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        sanitize(nested)
                    };
                    (key.clone(), sanitized)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        other => other.clone(),
    }
}
