// Theme log details - the payload attached to theme-related log events
//
// Every field is optional. Nothing here checks that the fields agree with
// each other: a value may carry `error: true` without a message, or both
// `success` and `error`. Callers describe what happened, the type records it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured payload describing the outcome of a theme operation
///
/// Serializes with camelCase field names and omits absent fields, so the
/// empty value is `{}` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThemeLogDetails {
    /// The logged operation succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    /// The logged operation failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,

    /// Identifier or name of the theme involved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Human-readable description of a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Free-form extra context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

/// Outcome derived from the success/error flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Unknown,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Unknown => "unknown",
        }
    }
}

impl ThemeLogDetails {
    /// Empty details (all fields absent)
    pub fn new() -> Self {
        Self::default()
    }

    /// Details for a theme operation that succeeded
    pub fn succeeded(theme: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            theme: Some(theme.into()),
            ..Self::default()
        }
    }

    /// Details for an operation that failed with the given message
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(true),
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn with_error(mut self, error: bool) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Insert a single detail entry, replacing any previous value for `key`
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Merge a map of detail entries (incoming keys win)
    pub fn with_details(mut self, extra: Map<String, Value>) -> Self {
        self.details.get_or_insert_with(Map::new).extend(extra);
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.success.is_none()
            && self.error.is_none()
            && self.theme.is_none()
            && self.error_message.is_none()
            && self.details.is_none()
    }

    /// Derive the outcome: an error flag takes priority over a success flag
    pub fn outcome(&self) -> Outcome {
        if self.error == Some(true) {
            Outcome::Failure
        } else if self.success == Some(true) {
            Outcome::Success
        } else {
            Outcome::Unknown
        }
    }

    /// JSON wire form
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(success) = self.success {
            map.insert("success".to_string(), Value::Bool(success));
        }
        if let Some(error) = self.error {
            map.insert("error".to_string(), Value::Bool(error));
        }
        if let Some(theme) = &self.theme {
            map.insert("theme".to_string(), Value::String(theme.clone()));
        }
        if let Some(message) = &self.error_message {
            map.insert("errorMessage".to_string(), Value::String(message.clone()));
        }
        if let Some(details) = &self.details {
            map.insert("details".to_string(), Value::Object(details.clone()));
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_serializes_to_empty_object() {
        let details = ThemeLogDetails::new();
        assert!(details.is_empty());
        assert_eq!(serde_json::to_string(&details).unwrap(), "{}");
        assert_eq!(details.to_value(), json!({}));
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let details = ThemeLogDetails::failed("failed to load theme");
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(
            value,
            json!({"error": true, "errorMessage": "failed to load theme"})
        );
        assert_eq!(details.to_value(), value);
    }

    #[test]
    fn test_succeeded_sets_theme_and_flag() {
        let details = ThemeLogDetails::succeeded("dark");
        assert_eq!(details.success, Some(true));
        assert_eq!(details.theme.as_deref(), Some("dark"));
        assert_eq!(details.error, None);
        assert_eq!(details.outcome(), Outcome::Success);
    }

    #[test]
    fn test_with_detail_replaces_existing_key() {
        let details = ThemeLogDetails::new()
            .with_detail("retries", 1)
            .with_detail("retries", 3);
        assert_eq!(details.details.unwrap().get("retries"), Some(&json!(3)));
    }

    #[test]
    fn test_with_details_merges() {
        let mut extra = Map::new();
        extra.insert("cssVarsCount".to_string(), json!(42));
        let details = ThemeLogDetails::new()
            .with_detail("themeName", "dark")
            .with_details(extra);
        let map = details.details.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["cssVarsCount"], json!(42));
    }

    #[test]
    fn test_error_wins_over_success() {
        let details = ThemeLogDetails::new().with_success(true).with_error(true);
        assert_eq!(details.outcome(), Outcome::Failure);
        assert_eq!(ThemeLogDetails::new().outcome(), Outcome::Unknown);
        assert_eq!(
            ThemeLogDetails::new().with_success(false).outcome(),
            Outcome::Unknown
        );
    }

    #[test]
    fn test_no_cross_field_validation() {
        // error without a message is accepted as-is
        let details: ThemeLogDetails = serde_json::from_value(json!({"error": true})).unwrap();
        assert_eq!(details.error, Some(true));
        assert!(details.error_message.is_none());
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: Result<ThemeLogDetails, _> =
            serde_json::from_value(json!({"theme": "dark", "source": "provider"}));
        assert!(result.is_err());
    }
}
