//! Resource tags: decoding, validation, and expand/flatten between
//! configuration and the ARM request/response bodies.

use crate::constants::{MAX_TAG_COUNT, MAX_TAG_KEY_LENGTH, MAX_TAG_VALUE_LENGTH};
use crate::error::{ExtensionError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type Tags = BTreeMap<String, String>;

/// Convert a raw tag value to its string form
///
/// Configuration languages commonly hand numbers and booleans through
/// unquoted; ARM only stores strings.
///
/// # Errors
///
/// Returns `Validation` for arrays, objects and null.
pub fn tag_value_to_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ExtensionError::validation(format!(
            "unknown tag type {} in tag value",
            json_type_name(other)
        ))),
    }
}

/// Check tag count and key/value lengths, returning one message per problem
#[must_use]
pub fn validate_tags(tags: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();

    if tags.len() > MAX_TAG_COUNT {
        errors.push(format!(
            "a maximum of {MAX_TAG_COUNT} tags can be applied to each ARM resource"
        ));
    }

    for (key, value) in tags {
        if key.chars().count() > MAX_TAG_KEY_LENGTH {
            errors.push(format!(
                "the maximum length for a tag key is {MAX_TAG_KEY_LENGTH} characters: {key:?} is {} characters",
                key.chars().count()
            ));
        }

        match tag_value_to_string(value) {
            Ok(v) if v.chars().count() > MAX_TAG_VALUE_LENGTH => errors.push(format!(
                "the maximum length for a tag value is {MAX_TAG_VALUE_LENGTH} characters: the value for {key:?} is {} characters",
                v.chars().count()
            )),
            Ok(_) => {}
            Err(e) => errors.push(format!("{e} (key {key:?})")),
        }
    }

    errors
}

/// Decode a raw tags attribute into a string map
///
/// # Errors
///
/// Returns `Validation` if any value cannot be represented as a string.
pub fn decode_tags(tags: &Map<String, Value>) -> Result<Tags> {
    tags.iter()
        .map(|(k, v)| Ok((k.clone(), tag_value_to_string(v)?)))
        .collect()
}

/// Tags as sent in an ARM request body
#[must_use]
pub fn expand_tags(tags: &Tags) -> Option<Tags> {
    Some(tags.clone())
}

/// Tags as stored in state; an absent map flattens to an empty one
#[must_use]
pub fn flatten_tags(tags: Option<&Tags>) -> Value {
    let map: Map<String, Value> = tags
        .into_iter()
        .flatten()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
