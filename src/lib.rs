//! Azure Virtual Machine Extension Resource Adapter
//!
//! Manages the lifecycle of Azure Virtual Machine Extensions
//! (`Microsoft.Compute/virtualMachines/extensions`) on behalf of a declarative
//! infrastructure host: the host hands over a [`ResourceData`] handle, and the
//! adapter creates, refreshes, updates or deletes the extension it describes.
//!
//! - `resource`: the lifecycle callbacks
//! - `schema`: attribute table, validation, decoding and planning
//! - `settings`: the settings JSON codec and diff suppressor
//! - `provider`: the ARM client seam and its REST implementation
//! - `azure`: resource IDs, locations and tags
//! - `config`, `observability`: environment configuration, logging and metrics

pub mod azure;
pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod settings;

pub use config::{AdapterConfig, AuthMode};
pub use error::{ExtensionError, Operation, Result};
pub use resource::{ResourceOptions, VirtualMachineExtensionResource};
pub use schema::{ExtensionConfig, ResourceData};
pub use settings::{parse_settings, render_settings, settings_equal, SettingsDocument};
