//! # Logging
//!
//! `tracing` subscriber setup for the binary.
//!
//! `RUST_LOG` takes precedence; otherwise the configured `LOG_LEVEL` applies
//! to this crate. `LOG_FORMAT=json` switches to one JSON object per line.

use crate::config::AdapterConfig;
use tracing_subscriber::EnvFilter;

/// Filter directive derived from the configured log level
#[must_use]
pub fn default_directive(config: &AdapterConfig) -> String {
    format!("azurerm_vm_extension={}", config.log_level.to_lowercase())
}

/// Install the global subscriber
///
/// Does nothing if a subscriber is already installed.
pub fn init_tracing(config: &AdapterConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let result = if config.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        let config = AdapterConfig {
            log_level: "DEBUG".to_string(),
            ..AdapterConfig::default()
        };
        assert_eq!(default_directive(&config), "azurerm_vm_extension=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = AdapterConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
