//! Attribute validators referenced from the schema table.
//!
//! Validators receive the attribute name and raw value and return one message
//! per problem; an empty vector means the value is acceptable.

use crate::azure::tags::validate_tags;
use serde_json::Value;

/// Signature shared by all attribute validators
pub type ValidateFn = fn(&str, &Value) -> Vec<String>;

/// Accept any syntactically valid JSON text
#[must_use]
pub fn validate_json_string(key: &str, value: &Value) -> Vec<String> {
    let Some(text) = value.as_str() else {
        return vec![format!("expected {key} to be a string")];
    };
    if text.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(_) => Vec::new(),
        Err(e) => vec![format!("{key} contains an invalid JSON: {e}")],
    }
}

/// Tag count and key/value length limits
#[must_use]
pub fn validate_tags_value(key: &str, value: &Value) -> Vec<String> {
    match value.as_object() {
        Some(tags) => validate_tags(tags),
        None => vec![format!("expected {key} to be a map")],
    }
}
