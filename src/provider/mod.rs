//! # Provider Modules
//!
//! Client seam between the resource adapter and Azure Resource Manager.
//!
//! The adapter only depends on [`VirtualMachineExtensionsClient`]; the REST
//! implementation lives in [`azure`], and tests supply in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

pub mod azure;
pub mod models;

pub use models::{VirtualMachineExtension, VirtualMachineExtensionProperties};

/// Failure reported by the remote API (or the transport in front of it)
#[derive(Debug, Clone, Error)]
#[error("{}", self.describe())]
pub struct ApiError {
    /// HTTP status, if a response was received
    pub status: Option<u16>,
    /// ARM error code, e.g. `ResourceNotFound`
    pub code: Option<String>,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: Option<u16>, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Error without an HTTP response (connection failures, token acquisition)
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, None, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Some(404), Some("NotFound".to_string()), message)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    fn describe(&self) -> String {
        match (self.status, self.code.as_deref()) {
            (Some(status), Some(code)) => format!("HTTP {status} {code}: {}", self.message),
            (Some(status), None) => format!("HTTP {status}: {}", self.message),
            (None, Some(code)) => format!("{code}: {}", self.message),
            (None, None) => self.message.clone(),
        }
    }
}

/// Capability set of the ARM virtual machine extensions API
///
/// Every call completes the remote operation before returning: long-running
/// PUT and DELETE operations are awaited until ARM reports a terminal state.
#[async_trait]
pub trait VirtualMachineExtensionsClient: Send + Sync {
    /// Create or replace an extension
    async fn create_or_update(
        &self,
        resource_group: &str,
        vm_name: &str,
        name: &str,
        extension: &VirtualMachineExtension,
    ) -> Result<VirtualMachineExtension, ApiError>;

    /// Fetch an extension; a missing extension is an error with status 404
    async fn get(
        &self,
        resource_group: &str,
        vm_name: &str,
        name: &str,
        expand: Option<&str>,
    ) -> Result<VirtualMachineExtension, ApiError>;

    /// Delete an extension
    async fn delete(&self, resource_group: &str, vm_name: &str, name: &str)
        -> Result<(), ApiError>;
}
