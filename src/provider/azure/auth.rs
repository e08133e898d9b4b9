//! Credential construction for Azure Resource Manager.

use crate::config::{AdapterConfig, AuthMode};
use crate::constants::ARM_TOKEN_SCOPE;
use crate::provider::ApiError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use azure_core::credentials::{AccessToken, Secret, TokenCredential, TokenRequestOptions};
use azure_identity::{ManagedIdentityCredential, WorkloadIdentityCredential};
use std::sync::Arc;
use tracing::{debug, info};

/// Mock TokenCredential for Pact testing
/// Returns a dummy token without attempting real Azure authentication
#[derive(Debug)]
pub struct MockTokenCredential;

#[async_trait]
impl TokenCredential for MockTokenCredential {
    async fn get_token(
        &self,
        _scopes: &[&str],
        _options: Option<TokenRequestOptions<'_>>,
    ) -> azure_core::Result<AccessToken> {
        use typespec_client_core::time::{Duration, OffsetDateTime};

        Ok(AccessToken::new(
            Secret::new("test-token".to_string()),
            OffsetDateTime::now_utc() + Duration::seconds(3600),
        ))
    }
}

/// Build the credential selected by the adapter configuration
///
/// # Errors
///
/// Returns an error if the Azure identity credential cannot be created.
pub fn build_credential(config: &AdapterConfig) -> Result<Arc<dyn TokenCredential>> {
    let credential: Arc<dyn TokenCredential> = match &config.auth {
        AuthMode::Mock => {
            debug!("Pact mode: using mock Azure credential");
            Arc::new(MockTokenCredential)
        }
        AuthMode::WorkloadIdentity { client_id } => {
            info!(
                "Using Azure Workload Identity authentication with client ID: {}",
                client_id
            );
            let options = azure_identity::WorkloadIdentityCredentialOptions {
                client_id: Some(client_id.clone()),
                ..Default::default()
            };
            WorkloadIdentityCredential::new(Some(options))
                .context("Failed to create WorkloadIdentityCredential")?
        }
        AuthMode::ManagedIdentity => {
            info!("No client ID configured, using Managed Identity");
            ManagedIdentityCredential::new(None)
                .context("Failed to create ManagedIdentityCredential")?
        }
    };
    Ok(credential)
}

/// Acquire a bearer token for ARM
pub(crate) async fn arm_token(credential: &Arc<dyn TokenCredential>) -> Result<String, ApiError> {
    let options = Some(TokenRequestOptions::default());
    let token = credential
        .get_token(&[ARM_TOKEN_SCOPE], options)
        .await
        .map_err(|e| ApiError::transport(format!("Failed to get Azure access token: {e}")))?;
    Ok(token.token.secret().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_credential_token() {
        let config = AdapterConfig {
            auth: AuthMode::Mock,
            ..AdapterConfig::default()
        };
        let credential = build_credential(&config).expect("mock credential should build");
        let token = arm_token(&credential).await.expect("mock token");
        assert_eq!(token, "test-token");
    }
}
