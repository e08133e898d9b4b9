//! # Constants
//!
//! Shared constants used throughout the adapter.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Resource type name under which the adapter is registered with the host
pub const RESOURCE_TYPE: &str = "azurerm_virtual_machine_extension";

/// Azure Resource Manager endpoint for the public cloud
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";

/// Token scope for Azure Resource Manager
pub const ARM_TOKEN_SCOPE: &str = "https://management.azure.com/.default";

/// Microsoft.Compute API version used for virtual machine extensions
pub const DEFAULT_COMPUTE_API_VERSION: &str = "2023-09-01";

/// Interval between polls of an `Azure-AsyncOperation` status URL (seconds)
pub const DEFAULT_LRO_POLL_INTERVAL_SECS: u64 = 10;

/// Per-request HTTP timeout (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// ARM resource provider namespace for compute resources
pub const COMPUTE_PROVIDER: &str = "Microsoft.Compute";

/// Path key for the parent virtual machine in an extension resource ID
pub const VIRTUAL_MACHINES_SEGMENT: &str = "virtualMachines";

/// Path key for the extension in an extension resource ID
pub const EXTENSIONS_SEGMENT: &str = "extensions";

/// Maximum number of tags accepted on a single resource
pub const MAX_TAG_COUNT: usize = 15;

/// Maximum tag key length (characters)
pub const MAX_TAG_KEY_LENGTH: usize = 512;

/// Maximum tag value length (characters)
pub const MAX_TAG_VALUE_LENGTH: usize = 256;
