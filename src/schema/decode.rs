//! Schema-driven validation and decoding of [`ResourceData`] into a typed
//! [`ExtensionConfig`].

use super::attributes::{
    resource_schema, AttributeKind, AUTO_UPGRADE_MINOR_VERSION, LOCATION, NAME,
    PROTECTED_SETTINGS, PUBLISHER, RESOURCE_GROUP_NAME, SETTINGS, TAGS, TYPE,
    TYPE_HANDLER_VERSION, VIRTUAL_MACHINE_NAME,
};
use super::data::ResourceData;
use crate::azure::tags::json_type_name;
use crate::azure::{decode_tags, Tags};
use crate::error::{ExtensionError, Result};
use schemars::JsonSchema;
use serde_json::Value;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Problem found while validating one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub attribute: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.attribute, self.message)
    }
}

/// Write-only settings payload; wiped from memory when dropped
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ProtectedSettings(String);

impl ProtectedSettings {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ProtectedSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProtectedSettings(***)")
    }
}

/// Typed configuration of a virtual machine extension
#[derive(Debug, Clone, PartialEq, JsonSchema)]
pub struct ExtensionConfig {
    /// Extension name; changing it recreates the extension
    pub name: String,
    /// Azure region; changing it recreates the extension
    pub location: String,
    /// Resource group of the parent virtual machine; changing it recreates the extension
    pub resource_group_name: String,
    /// Parent virtual machine; changing it recreates the extension
    pub virtual_machine_name: String,
    /// Extension publisher, e.g. `Microsoft.Azure.Extensions`
    pub publisher: String,
    /// Extension type, e.g. `CustomScript`
    #[schemars(rename = "type")]
    pub extension_type: String,
    /// Handler version, e.g. `2.0`
    pub type_handler_version: String,
    #[schemars(default)]
    pub auto_upgrade_minor_version: bool,
    /// Public settings as JSON text
    pub settings: Option<String>,
    /// Secret settings as JSON text; never read back from Azure
    #[schemars(with = "Option<String>")]
    pub protected_settings: Option<ProtectedSettings>,
    #[schemars(default)]
    pub tags: Tags,
}

impl ExtensionConfig {
    /// Decode a handle into typed configuration
    ///
    /// Types, required attributes and attribute validators are all enforced
    /// here, so the adapter never deals with raw values.
    ///
    /// # Errors
    ///
    /// Returns `Validation` listing every problem found.
    pub fn decode(data: &ResourceData) -> Result<Self> {
        let diagnostics = validate(data);
        if !diagnostics.is_empty() {
            let messages: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
            return Err(ExtensionError::validation(format!(
                "invalid virtual machine extension configuration: {}",
                messages.join("; ")
            )));
        }

        let string = |key: &str| data.get_str(key).unwrap_or_default().to_string();
        let optional_string =
            |key: &str| data.get_str(key).filter(|s| !s.is_empty()).map(str::to_string);

        let tags = match data.get(TAGS).and_then(Value::as_object) {
            Some(raw) => decode_tags(raw)?,
            None => Tags::new(),
        };

        Ok(Self {
            name: string(NAME),
            location: string(LOCATION),
            resource_group_name: string(RESOURCE_GROUP_NAME),
            virtual_machine_name: string(VIRTUAL_MACHINE_NAME),
            publisher: string(PUBLISHER),
            extension_type: string(TYPE),
            type_handler_version: string(TYPE_HANDLER_VERSION),
            auto_upgrade_minor_version: data
                .get(AUTO_UPGRADE_MINOR_VERSION)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            settings: optional_string(SETTINGS),
            protected_settings: optional_string(PROTECTED_SETTINGS).map(ProtectedSettings::new),
            tags,
        })
    }
}

/// Check a handle against the resource schema
///
/// Reports unknown attributes, missing required attributes, type mismatches
/// and validator failures.
#[must_use]
pub fn validate(data: &ResourceData) -> Vec<Diagnostic> {
    let schema = resource_schema();
    let mut diagnostics = Vec::new();
    let mut push = |attribute: &str, message: String| {
        diagnostics.push(Diagnostic {
            attribute: attribute.to_string(),
            message,
        });
    };

    for key in data.attributes().keys() {
        if !schema.iter().any(|a| a.name == key) {
            push(key, "unsupported attribute".to_string());
        }
    }

    for attr in schema {
        let Some(value) = data.get(attr.name) else {
            if attr.required {
                push(attr.name, "is required".to_string());
            }
            continue;
        };

        let type_ok = match attr.kind {
            AttributeKind::String => value.is_string(),
            AttributeKind::Bool => value.is_boolean(),
            AttributeKind::Map => value.is_object(),
        };
        if !type_ok {
            push(
                attr.name,
                format!(
                    "expected {}, got {}",
                    attr.kind.as_str(),
                    json_type_name(value)
                ),
            );
            continue;
        }

        if attr.required && value.as_str().is_some_and(str::is_empty) {
            push(attr.name, "must not be empty".to_string());
            continue;
        }

        if let Some(validator) = attr.validate {
            for message in validator(attr.name, value) {
                push(attr.name, message);
            }
        }
    }

    diagnostics
}
