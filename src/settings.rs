//! # Extension Settings
//!
//! Codec and diff suppression for the `settings` and `protected_settings`
//! attributes.
//!
//! Settings are free-form JSON objects passed through to the extension agent.
//! Users write them as JSON text, the API returns them as structured JSON, so
//! the textual form stored in state rarely matches the declared one byte for
//! byte. [`settings_equal`] compares the parsed forms instead.

use crate::error::{ExtensionError, Result};
use serde_json::{Map, Value};

/// Parsed settings document: string keys to arbitrary JSON values
pub type SettingsDocument = Map<String, Value>;

/// Parse JSON text into a settings document
///
/// # Errors
///
/// Returns `Serialization` if the text is not valid JSON or is not a JSON object.
pub fn parse_settings(text: &str) -> Result<SettingsDocument> {
    serde_json::from_str::<SettingsDocument>(text)
        .map_err(|e| ExtensionError::serialization(e.to_string()))
}

/// Render a settings document as compact JSON text
///
/// Keys come out in sorted order, so the result is stable for a given document.
///
/// # Errors
///
/// Returns `Serialization` if the document cannot be encoded.
pub fn render_settings(document: &SettingsDocument) -> Result<String> {
    serde_json::to_string(document).map_err(|e| ExtensionError::serialization(e.to_string()))
}

/// Diff-suppression predicate for settings attributes
///
/// Returns `true` when both texts parse and describe the same document,
/// ignoring whitespace and key order. Unparseable input on either side is
/// treated as a real difference.
#[must_use]
pub fn settings_equal(old: &str, new: &str) -> bool {
    let Ok(old_doc) = parse_settings(old) else {
        return false;
    };
    let Ok(new_doc) = parse_settings(new) else {
        return false;
    };
    objects_equal(&old_doc, &new_doc)
}

/// Structural equality over JSON values
///
/// Numbers compare by numeric value, so `1` and `1.0` are equal.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => objects_equal(x, y),
        _ => false,
    }
}

fn objects_equal(a: &SettingsDocument, b: &SettingsDocument) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| values_equal(value, other)))
}
