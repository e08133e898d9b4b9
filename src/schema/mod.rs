//! # Resource Schema
//!
//! Declares the attributes of the virtual machine extension resource and the
//! handle through which the host exchanges configuration and state with the
//! adapter.
//!
//! - `attributes`: the attribute table (types, required, force-new, sensitive)
//! - `data`: [`ResourceData`], the mutable configuration/state handle
//! - `decode`: validation and decoding into [`ExtensionConfig`]
//! - `plan`: attribute-level diff between prior state and new configuration
//! - `validation`: attribute validators

pub mod attributes;
pub mod data;
pub mod decode;
pub mod plan;
pub mod validation;

// Re-export for convenience
pub use attributes::{attribute, resource_schema, Attribute, AttributeKind};
pub use data::ResourceData;
pub use decode::{validate, Diagnostic, ExtensionConfig, ProtectedSettings};
pub use plan::{plan, AttributeChange, Plan, PlanAction};
