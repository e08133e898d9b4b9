//! # Adapter Configuration
//!
//! Adapter-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_ARM_ENDPOINT, DEFAULT_COMPUTE_API_VERSION, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_LRO_POLL_INTERVAL_SECS,
};
use std::time::Duration;

/// How the ARM client obtains its bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Managed Identity (works automatically on Azure compute)
    ManagedIdentity,
    /// Workload Identity federation for the given client ID
    WorkloadIdentity { client_id: String },
    /// Static dummy token, used against Pact mock servers
    Mock,
}

/// Adapter-level configuration
///
/// All settings have defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Azure Resource Manager endpoint
    pub arm_endpoint: String,
    /// Subscription that owns the managed extensions
    pub subscription_id: Option<String>,
    /// Credential selection
    pub auth: AuthMode,
    /// `api-version` query parameter for Microsoft.Compute calls
    pub compute_api_version: String,
    /// Interval between long-running operation status polls (seconds)
    pub lro_poll_interval_secs: u64,
    /// Per-request HTTP timeout (seconds)
    pub http_timeout_secs: u64,
    /// Surface remote delete failures instead of logging and continuing
    pub fail_on_delete_error: bool,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
    /// Enable metrics collection
    pub enable_metrics: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            arm_endpoint: DEFAULT_ARM_ENDPOINT.to_string(),
            subscription_id: None,
            auth: AuthMode::ManagedIdentity,
            compute_api_version: DEFAULT_COMPUTE_API_VERSION.to_string(),
            lro_poll_interval_secs: DEFAULT_LRO_POLL_INTERVAL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            fail_on_delete_error: false,
            log_level: "INFO".to_string(),
            log_format: "text".to_string(),
            enable_metrics: true,
        }
    }
}

impl AdapterConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth = if lookup("PACT_MODE").is_some_and(|v| parse_bool(&v)) {
            AuthMode::Mock
        } else if let Some(client_id) = lookup("ARM_CLIENT_ID").filter(|v| !v.is_empty()) {
            AuthMode::WorkloadIdentity { client_id }
        } else {
            AuthMode::ManagedIdentity
        };

        Self {
            arm_endpoint: lookup("ARM_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ARM_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            subscription_id: lookup("ARM_SUBSCRIPTION_ID").filter(|v| !v.is_empty()),
            auth,
            compute_api_version: lookup("COMPUTE_API_VERSION")
                .unwrap_or_else(|| DEFAULT_COMPUTE_API_VERSION.to_string()),
            lro_poll_interval_secs: parsed_or_default(
                lookup("LRO_POLL_INTERVAL_SECS"),
                DEFAULT_LRO_POLL_INTERVAL_SECS,
            ),
            http_timeout_secs: parsed_or_default(
                lookup("HTTP_TIMEOUT_SECS"),
                DEFAULT_HTTP_TIMEOUT_SECS,
            ),
            fail_on_delete_error: lookup("FAIL_ON_DELETE_ERROR").is_some_and(|v| parse_bool(&v)),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "INFO".to_string()),
            log_format: lookup("LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
            enable_metrics: lookup("ENABLE_METRICS").map_or(true, |v| parse_bool(&v)),
        }
    }

    /// Get long-running operation poll interval
    #[must_use]
    pub fn lro_poll_interval(&self) -> Duration {
        Duration::from_secs(self.lro_poll_interval_secs)
    }

    /// Get HTTP request timeout
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Parse value or return default value
fn parsed_or_default<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    let v_lower = value.to_lowercase();
    v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
}
