//! Mutable configuration/state handle exchanged with the host.

use super::attributes::attribute;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const REDACTED: &str = "(sensitive)";

/// Identity plus raw attribute values of one managed extension
///
/// The host fills it from configuration before create/update, and persists
/// whatever the adapter leaves in it afterwards. An empty ID means the
/// extension does not exist remotely.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl ResourceData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            attributes,
        }
    }

    /// Handle carrying only an identity, as produced by import
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        Some(self.id.as_str()).filter(|id| !id.is_empty())
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Forget the identity; the host treats the extension as gone
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    /// Raw value of an attribute; explicit nulls read as absent
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl std::fmt::Debug for ResourceData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| {
                let sensitive = attribute(k).is_some_and(|a| a.sensitive);
                let shown = if sensitive { Value::from(REDACTED) } else { v.clone() };
                (k.clone(), shown)
            })
            .collect();
        f.debug_struct("ResourceData")
            .field("id", &self.id)
            .field("attributes", &redacted)
            .finish()
    }
}
