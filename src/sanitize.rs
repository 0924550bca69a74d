//! Conversion of arbitrary values and errors into detail maps
//!
//! Whatever a call site hands over as context, the `details` field of a theme
//! event is always a string-keyed map. Non-object inputs are wrapped under a
//! single well-known key so nothing is lost.

use crate::details::ThemeLogDetails;
use serde_json::{Map, Value};

/// Key used to wrap a top-level array
pub const ARRAY_KEY: &str = "array";

/// Key used to wrap a top-level scalar or null
pub const VALUE_KEY: &str = "value";

/// Turn any JSON value into a detail map
///
/// - object: same keys, nested objects sanitized recursively
/// - array: `{"array": [...]}`
/// - null or scalar: `{"value": v}`
pub fn to_log_details(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, val)| (key.clone(), sanitize_nested(val)))
            .collect(),
        Value::Array(items) => {
            let mut map = Map::new();
            map.insert(
                ARRAY_KEY.to_string(),
                Value::Array(items.iter().map(sanitize_nested).collect()),
            );
            map
        }
        other => {
            let mut map = Map::new();
            map.insert(VALUE_KEY.to_string(), other.clone());
            map
        }
    }
}

fn sanitize_nested(value: &Value) -> Value {
    match value {
        Value::Object(_) => Value::Object(to_log_details(value)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_nested).collect()),
        other => other.clone(),
    }
}

/// Describe an error and its source chain
///
/// `{"message": "..."}`, plus `"causes": [...]` when the error has sources.
pub fn error_details(err: &(dyn std::error::Error + 'static)) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("message".to_string(), Value::String(err.to_string()));

    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(Value::String(cause.to_string()));
        source = cause.source();
    }
    if !causes.is_empty() {
        map.insert("causes".to_string(), Value::Array(causes));
    }

    map
}

impl ThemeLogDetails {
    /// Failure details for `theme` built from an error and its causes
    pub fn from_error(theme: impl Into<String>, err: &(dyn std::error::Error + 'static)) -> Self {
        Self::failed(err.to_string())
            .with_theme(theme)
            .with_details(error_details(err))
    }
}
