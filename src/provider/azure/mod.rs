//! # Azure Providers
//!
//! Azure Resource Manager implementation of the client seam.
//!
//! - `auth`: credential selection (Workload Identity, Managed Identity, Pact mock)
//! - `compute`: REST client for virtual machine extensions

pub mod auth;
pub mod compute;

// Re-export for convenience
pub use auth::{build_credential, MockTokenCredential};
pub use compute::ComputeRestClient;
