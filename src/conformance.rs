// Shape conformance for untyped JSON values
//
// Log payloads often arrive as loose JSON (from the CLI, from other processes,
// from older call sites). This module checks such a value against the
// ThemeLogDetails shape and produces the typed value.
//
// Two policies:
// - Strict: the shape is closed, any undeclared top-level field is rejected
// - Open: undeclared fields are tolerated and folded into `details`

use crate::details::ThemeLogDetails;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Declared top-level fields, in wire form
pub const DECLARED_FIELDS: [&str; 5] = ["success", "error", "theme", "errorMessage", "details"];

/// How undeclared top-level fields are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conformance {
    /// Reject undeclared fields (default)
    #[default]
    Strict,
    /// Move undeclared fields into `details`
    Open,
}

impl Conformance {
    /// Parse a policy name from config or env; unknown names yield None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "open" => Some(Self::Open),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Open => "open",
        }
    }
}

/// Why a value does not conform to the shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Top-level value is not a JSON object
    NotAnObject { found: &'static str },
    /// Undeclared field under the strict policy
    UnknownField { field: String },
    /// Declared field carries a value of the wrong JSON type
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    /// Input text is not JSON at all
    Json(String),
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { found } => write!(f, "expected an object, found {}", found),
            Self::UnknownField { field } => write!(f, "unknown field `{}`", field),
            Self::WrongType {
                field,
                expected,
                found,
            } => write!(f, "field `{}` must be {}, found {}", field, expected, found),
            Self::Json(msg) => write!(f, "invalid JSON: {}", msg),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Name of a JSON value's type, for error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn bool_field(map: &Map<String, Value>, field: &'static str) -> Result<Option<bool>, ShapeError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(ShapeError::WrongType {
            field,
            expected: "a boolean",
            found: json_type_name(other),
        }),
    }
}

fn string_field(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ShapeError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ShapeError::WrongType {
            field,
            expected: "a string",
            found: json_type_name(other),
        }),
    }
}

fn object_field(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Map<String, Value>>, ShapeError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(obj)) => Ok(Some(obj.clone())),
        Some(other) => Err(ShapeError::WrongType {
            field,
            expected: "an object",
            found: json_type_name(other),
        }),
    }
}

/// Check a JSON value against the shape and build the typed details
///
/// `null` for a declared field counts as absent. Under `Open`, undeclared
/// fields land in `details`; a key already present in `details` is kept.
pub fn parse_details(value: &Value, policy: Conformance) -> Result<ThemeLogDetails, ShapeError> {
    let Value::Object(map) = value else {
        return Err(ShapeError::NotAnObject {
            found: json_type_name(value),
        });
    };

    let extras: Vec<(&String, &Value)> = map
        .iter()
        .filter(|(key, _)| !DECLARED_FIELDS.contains(&key.as_str()))
        .collect();

    if policy == Conformance::Strict {
        if let Some((field, _)) = extras.first() {
            return Err(ShapeError::UnknownField {
                field: (*field).clone(),
            });
        }
    }

    let mut details = ThemeLogDetails {
        success: bool_field(map, "success")?,
        error: bool_field(map, "error")?,
        theme: string_field(map, "theme")?,
        error_message: string_field(map, "errorMessage")?,
        details: object_field(map, "details")?,
    };

    if !extras.is_empty() {
        let folded = details.details.get_or_insert_with(Map::new);
        for (key, value) in extras {
            folded
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    Ok(details)
}

/// Same as [`parse_details`], from JSON text
pub fn parse_details_str(text: &str, policy: Conformance) -> Result<ThemeLogDetails, ShapeError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ShapeError::Json(e.to_string()))?;
    parse_details(&value, policy)
}

/// True when the value conforms under the given policy
pub fn conforms(value: &Value, policy: Conformance) -> bool {
    parse_details(value, policy).is_ok()
}
