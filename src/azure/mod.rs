//! # Azure Helpers
//!
//! Azure Resource Manager conventions shared by the adapter and schema.
//!
//! - `resource_id`: parsing and formatting of ARM resource IDs
//! - `location`: region name normalization
//! - `tags`: tag decoding, validation, expand/flatten

pub mod location;
pub mod resource_id;
pub mod tags;

// Re-export for convenience
pub use location::{locations_equal, normalize_location};
pub use resource_id::{AzureResourceId, ExtensionId};
pub use tags::{decode_tags, expand_tags, flatten_tags, validate_tags, Tags};
