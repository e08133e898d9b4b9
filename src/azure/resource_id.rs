//! # Azure Resource IDs
//!
//! Parsing of ARM resource IDs such as
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Compute/virtualMachines/{vm}/extensions/{name}`.

use crate::constants::{COMPUTE_PROVIDER, EXTENSIONS_SEGMENT, VIRTUAL_MACHINES_SEGMENT};
use crate::error::{ExtensionError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Generic ARM resource ID split into its key/value segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub provider: String,
    pub path: BTreeMap<String, String>,
}

impl FromStr for AzureResourceId {
    type Err = ExtensionError;

    fn from_str(id: &str) -> Result<Self> {
        let trimmed = id.trim_matches('/');
        if trimmed.is_empty() {
            return Err(ExtensionError::validation(format!(
                "Cannot parse Azure ID: {id:?} is empty"
            )));
        }

        let components: Vec<&str> = trimmed.split('/').collect();
        if components.len() % 2 != 0 {
            return Err(ExtensionError::validation(format!(
                "The number of path segments is not divisible by 2 in {id:?}"
            )));
        }

        let mut subscription_id = None;
        let mut resource_group = None;
        let mut provider = None;
        let mut path = BTreeMap::new();

        for pair in components.chunks_exact(2) {
            let (key, value) = (pair[0], pair[1]);
            if key.is_empty() || value.is_empty() {
                return Err(ExtensionError::validation(format!(
                    "Key/Value cannot be empty strings. Key: {key:?}, Value: {value:?}"
                )));
            }
            match key {
                "subscriptions" => subscription_id = Some(value.to_string()),
                "resourceGroups" => resource_group = Some(value.to_string()),
                "providers" => provider = Some(value.to_string()),
                _ => {
                    path.insert(key.to_string(), value.to_string());
                }
            }
        }

        let subscription_id = subscription_id.ok_or_else(|| {
            ExtensionError::validation(format!("No subscription ID found in: {id:?}"))
        })?;
        let resource_group = resource_group.ok_or_else(|| {
            ExtensionError::validation(format!("No resource group name found in: {id:?}"))
        })?;

        Ok(Self {
            subscription_id,
            resource_group,
            provider: provider.unwrap_or_default(),
            path,
        })
    }
}

/// Identity of a virtual machine extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionId {
    pub subscription_id: String,
    pub resource_group: String,
    pub virtual_machine_name: String,
    pub name: String,
}

impl TryFrom<AzureResourceId> for ExtensionId {
    type Error = ExtensionError;

    fn try_from(mut id: AzureResourceId) -> Result<Self> {
        let virtual_machine_name = id.path.remove(VIRTUAL_MACHINES_SEGMENT).ok_or_else(|| {
            ExtensionError::validation(format!(
                "ID is missing the {VIRTUAL_MACHINES_SEGMENT:?} segment"
            ))
        })?;
        let name = id.path.remove(EXTENSIONS_SEGMENT).ok_or_else(|| {
            ExtensionError::validation(format!("ID is missing the {EXTENSIONS_SEGMENT:?} segment"))
        })?;
        Ok(Self {
            subscription_id: id.subscription_id,
            resource_group: id.resource_group,
            virtual_machine_name,
            name,
        })
    }
}

impl FromStr for ExtensionId {
    type Err = ExtensionError;

    fn from_str(id: &str) -> Result<Self> {
        id.parse::<AzureResourceId>()?.try_into()
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{COMPUTE_PROVIDER}/{VIRTUAL_MACHINES_SEGMENT}/{}/{EXTENSIONS_SEGMENT}/{}",
            self.subscription_id, self.resource_group, self.virtual_machine_name, self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENSION_ID: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/acctestRG/providers/Microsoft.Compute/virtualMachines/acctvm/extensions/ext1";

    #[test]
    fn test_parse_generic_id() {
        let id: AzureResourceId = EXTENSION_ID.parse().unwrap();
        assert_eq!(id.subscription_id, "00000000-0000-0000-0000-000000000000");
        assert_eq!(id.resource_group, "acctestRG");
        assert_eq!(id.provider, "Microsoft.Compute");
        assert_eq!(id.path.get("virtualMachines").map(String::as_str), Some("acctvm"));
        assert_eq!(id.path.get("extensions").map(String::as_str), Some("ext1"));
    }

    #[test]
    fn test_parse_extension_id_round_trip() {
        let id: ExtensionId = EXTENSION_ID.parse().unwrap();
        assert_eq!(id.resource_group, "acctestRG");
        assert_eq!(id.virtual_machine_name, "acctvm");
        assert_eq!(id.name, "ext1");
        assert_eq!(id.to_string(), EXTENSION_ID);
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let id: ExtensionId = format!("{EXTENSION_ID}/").parse().unwrap();
        assert_eq!(id.name, "ext1");
    }

    #[test]
    fn test_odd_segment_count_rejected() {
        let err = "/subscriptions/sub/resourceGroups".parse::<AzureResourceId>().unwrap_err();
        assert!(err.to_string().contains("not divisible by 2"));
    }

    #[test]
    fn test_missing_subscription_rejected() {
        let err = "/resourceGroups/rg/providers/Microsoft.Compute"
            .parse::<AzureResourceId>()
            .unwrap_err();
        assert!(err.to_string().contains("No subscription ID"));
    }

    #[test]
    fn test_missing_resource_group_rejected() {
        assert!("/subscriptions/sub/providers/Microsoft.Compute"
            .parse::<AzureResourceId>()
            .is_err());
    }

    #[test]
    fn test_extension_segments_required() {
        let err = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm"
            .parse::<ExtensionId>()
            .unwrap_err();
        assert!(matches!(err, ExtensionError::Validation(_)));
    }

    #[test]
    fn test_empty_and_garbage_ids_rejected() {
        for id in ["", "/", "not-an-id", "/subscriptions//resourceGroups/rg"] {
            assert!(id.parse::<ExtensionId>().is_err(), "{id:?} should be rejected");
        }
    }
}
