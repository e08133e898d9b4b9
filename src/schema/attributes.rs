//! Attribute table of the `azurerm_virtual_machine_extension` resource.

use super::validation::{validate_json_string, validate_tags_value, ValidateFn};
use crate::azure::locations_equal;
use crate::settings::settings_equal;

pub const NAME: &str = "name";
pub const LOCATION: &str = "location";
pub const RESOURCE_GROUP_NAME: &str = "resource_group_name";
pub const VIRTUAL_MACHINE_NAME: &str = "virtual_machine_name";
pub const PUBLISHER: &str = "publisher";
pub const TYPE: &str = "type";
pub const TYPE_HANDLER_VERSION: &str = "type_handler_version";
pub const AUTO_UPGRADE_MINOR_VERSION: &str = "auto_upgrade_minor_version";
pub const SETTINGS: &str = "settings";
pub const PROTECTED_SETTINGS: &str = "protected_settings";
pub const TAGS: &str = "tags";

/// Returns `true` when a textual difference between old and new is not a real change
pub type DiffSuppressFn = fn(&str, &str) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Bool,
    /// String-to-string map
    Map,
}

impl AttributeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Bool => "bool",
            AttributeKind::Map => "map",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub required: bool,
    /// Changing the value destroys and recreates the extension
    pub force_new: bool,
    /// Value is redacted in plans and debug output
    pub sensitive: bool,
    /// Value may be filled in from the remote side when not configured
    pub computed: bool,
    pub validate: Option<ValidateFn>,
    pub diff_suppress: Option<DiffSuppressFn>,
}

impl Attribute {
    const fn new(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            force_new: false,
            sensitive: false,
            computed: false,
            validate: None,
            diff_suppress: None,
        }
    }

    #[must_use]
    pub const fn required_string(name: &'static str) -> Self {
        Self::new(name, AttributeKind::String).required()
    }

    #[must_use]
    pub const fn optional_string(name: &'static str) -> Self {
        Self::new(name, AttributeKind::String)
    }

    #[must_use]
    pub const fn optional_bool(name: &'static str) -> Self {
        Self::new(name, AttributeKind::Bool)
    }

    #[must_use]
    pub const fn optional_map(name: &'static str) -> Self {
        Self::new(name, AttributeKind::Map)
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub const fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    #[must_use]
    pub const fn with_validator(mut self, validate: ValidateFn) -> Self {
        self.validate = Some(validate);
        self
    }

    #[must_use]
    pub const fn with_diff_suppress(mut self, diff_suppress: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(diff_suppress);
        self
    }
}

static RESOURCE_SCHEMA: [Attribute; 11] = [
    Attribute::required_string(NAME).force_new(),
    Attribute::required_string(LOCATION)
        .force_new()
        .with_diff_suppress(locations_equal),
    Attribute::required_string(RESOURCE_GROUP_NAME).force_new(),
    Attribute::required_string(VIRTUAL_MACHINE_NAME).force_new(),
    Attribute::required_string(PUBLISHER),
    Attribute::required_string(TYPE),
    Attribute::required_string(TYPE_HANDLER_VERSION),
    Attribute::optional_bool(AUTO_UPGRADE_MINOR_VERSION),
    Attribute::optional_string(SETTINGS)
        .with_validator(validate_json_string)
        .with_diff_suppress(settings_equal),
    // The API never returns these, so they are only ever compared against the
    // previously applied configuration.
    Attribute::optional_string(PROTECTED_SETTINGS)
        .sensitive()
        .with_validator(validate_json_string)
        .with_diff_suppress(settings_equal),
    Attribute::optional_map(TAGS)
        .computed()
        .with_validator(validate_tags_value),
];

/// Attributes of the virtual machine extension resource, in declaration order
#[must_use]
pub fn resource_schema() -> &'static [Attribute] {
    &RESOURCE_SCHEMA
}

/// Look up a single attribute by name
#[must_use]
pub fn attribute(name: &str) -> Option<&'static Attribute> {
    RESOURCE_SCHEMA.iter().find(|a| a.name == name)
}
