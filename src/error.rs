//! # Errors
//!
//! Error taxonomy surfaced by the resource adapter to its host.
//!
//! - `Validation`: local configuration problems (malformed JSON settings,
//!   malformed resource IDs, missing or mistyped attributes). Raised before
//!   any remote call is made.
//! - `Serialization`: JSON encode/decode failures on settings returned by the API.
//! - `Remote`: any non-success response from Azure Resource Manager, wrapped
//!   with the operation and extension name.
//! - `Integrity`: the API reported success but returned no usable identity.

use crate::provider::ApiError;
use thiserror::Error;

/// Lifecycle operation that issued a remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Delete,
}

impl Operation {
    /// Label used in logs and metrics
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Serialization(String),

    #[error("{message}: {source}")]
    Remote {
        operation: Operation,
        name: String,
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("{0}")]
    Integrity(String),
}

impl ExtensionError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    pub(crate) fn remote(
        operation: Operation,
        name: &str,
        message: impl Into<String>,
        source: ApiError,
    ) -> Self {
        Self::Remote {
            operation,
            name: name.to_string(),
            message: message.into(),
            source,
        }
    }

    /// Short label for the error class, used as a metrics/log field
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Serialization(_) => "serialization",
            Self::Remote { .. } => "remote",
            Self::Integrity(_) => "integrity",
        }
    }
}

pub type Result<T, E = ExtensionError> = std::result::Result<T, E>;
