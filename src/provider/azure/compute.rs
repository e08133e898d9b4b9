//! # Azure Compute REST Client
//!
//! Client for the `Microsoft.Compute/virtualMachines/extensions` ARM API.
//!
//! This module provides functionality to:
//! - Create or replace extensions (PUT), waiting for the deployment to finish
//! - Retrieve extensions (GET), reporting a missing extension as HTTP 404
//! - Delete extensions (DELETE), waiting for the removal to finish
//!
//! Long-running operations are followed through the `Azure-AsyncOperation`
//! header (or `Location` when ARM sends only that) at a fixed interval until
//! ARM reports a terminal state. Failed requests are not retried.

use super::auth::{arm_token, build_credential};
use crate::config::AdapterConfig;
use crate::constants::{COMPUTE_PROVIDER, EXTENSIONS_SEGMENT, VIRTUAL_MACHINES_SEGMENT};
use crate::provider::models::{ArmErrorResponse, AsyncOperationStatus};
use crate::provider::{ApiError, VirtualMachineExtension, VirtualMachineExtensionsClient};
use anyhow::{Context, Result};
use async_trait::async_trait;
use azure_core::credentials::TokenCredential;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, Instrument};

const ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";
const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// REST implementation of [`VirtualMachineExtensionsClient`]
pub struct ComputeRestClient {
    http: Client,
    credential: Arc<dyn TokenCredential>,
    endpoint: String,
    subscription_id: String,
    api_version: String,
    poll_interval: Duration,
}

impl std::fmt::Debug for ComputeRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeRestClient")
            .field("endpoint", &self.endpoint)
            .field("subscription_id", &self.subscription_id)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl ComputeRestClient {
    /// Create a client using the credential selected by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if no subscription is configured or the credential
    /// or HTTP client cannot be created.
    pub fn new(config: &AdapterConfig) -> Result<Self> {
        let credential = build_credential(config)?;
        Self::with_credential(config, credential)
    }

    /// Create a client with an explicit credential
    ///
    /// # Errors
    ///
    /// Returns an error if no subscription is configured or the HTTP client
    /// cannot be created.
    pub fn with_credential(
        config: &AdapterConfig,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self> {
        let subscription_id = config
            .subscription_id
            .clone()
            .context("ARM_SUBSCRIPTION_ID must be set to manage virtual machine extensions")?;

        let http = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        info!(
            "Azure Compute client endpoint: {} (api-version {})",
            config.arm_endpoint, config.compute_api_version
        );

        Ok(Self {
            http,
            credential,
            endpoint: config.arm_endpoint.trim_end_matches('/').to_string(),
            subscription_id,
            api_version: config.compute_api_version.clone(),
            poll_interval: config.lro_poll_interval(),
        })
    }

    /// Path of an extension below the ARM endpoint
    #[must_use]
    pub fn extension_path(&self, resource_group: &str, vm_name: &str, name: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{resource_group}/providers/{COMPUTE_PROVIDER}/{VIRTUAL_MACHINES_SEGMENT}/{vm_name}/{EXTENSIONS_SEGMENT}/{name}",
            self.subscription_id
        )
    }

    fn extension_url(&self, resource_group: &str, vm_name: &str, name: &str) -> String {
        format!(
            "{}{}",
            self.endpoint,
            self.extension_path(resource_group, vm_name, name)
        )
    }

    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, ApiError> {
        let token = arm_token(&self.credential).await?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(CLIENT_REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string()))
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        request
            .send()
            .await
            .map_err(|e| ApiError::transport(format!("Request to Azure Resource Manager failed: {e}")))
    }

    /// Resolve a status URL; relative URLs are taken against the ARM endpoint
    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{url}", self.endpoint)
        } else {
            url.to_string()
        }
    }

    /// Follow a long-running operation until it reaches a terminal state
    async fn wait_for_completion(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        if let Some(status_url) = header_value(headers, ASYNC_OPERATION_HEADER) {
            return self.poll_async_operation(&self.absolute_url(&status_url)).await;
        }
        if let Some(location) = header_value(headers, reqwest::header::LOCATION.as_str()) {
            return self.poll_location(&self.absolute_url(&location)).await;
        }
        Ok(())
    }

    async fn poll_async_operation(&self, status_url: &str) -> Result<(), ApiError> {
        loop {
            tokio::time::sleep(self.poll_interval).await;
            let response = Self::send(self.request(Method::GET, status_url).await?).await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }
            let status: AsyncOperationStatus = response.json().await.map_err(|e| {
                ApiError::transport(format!("Failed to decode async operation status: {e}"))
            })?;
            debug!("Async operation status: {}", status.status);
            if status.is_terminal() {
                if status.is_success() {
                    return Ok(());
                }
                let detail = status.error.unwrap_or_default();
                return Err(ApiError::new(
                    None,
                    detail.code.or(Some(status.status.clone())),
                    detail
                        .message
                        .unwrap_or_else(|| format!("long-running operation {}", status.status)),
                ));
            }
        }
    }

    async fn poll_location(&self, location: &str) -> Result<(), ApiError> {
        loop {
            tokio::time::sleep(self.poll_interval).await;
            let response = Self::send(self.request(Method::GET, location).await?).await?;
            match LocationPoll::from_status(response.status()) {
                LocationPoll::Pending => debug!("Operation still in progress"),
                LocationPoll::Done => return Ok(()),
                LocationPoll::Failed => return Err(error_from_response(response).await),
            }
        }
    }
}

#[async_trait]
impl VirtualMachineExtensionsClient for ComputeRestClient {
    async fn create_or_update(
        &self,
        resource_group: &str,
        vm_name: &str,
        name: &str,
        extension: &VirtualMachineExtension,
    ) -> Result<VirtualMachineExtension, ApiError> {
        let span = tracing::debug_span!(
            "azure.compute.extension.put",
            extension.name = name,
            vm.name = vm_name,
            resource_group = resource_group
        );

        async move {
            let url = self.extension_url(resource_group, vm_name, name);
            let request = self
                .request(Method::PUT, &url)
                .await?
                .query(&[("api-version", self.api_version.as_str())])
                .json(extension);
            let response = Self::send(request).await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await.map_err(|e| {
                ApiError::transport(format!("Failed to read extension response: {e}"))
            })?;

            if is_long_running(status, &headers) {
                self.wait_for_completion(&headers).await?;
                return self.get(resource_group, vm_name, name, None).await;
            }
            if body.trim().is_empty() {
                return Err(ApiError::new(
                    Some(status.as_u16()),
                    None,
                    "Azure returned an empty extension response".to_string(),
                ));
            }
            serde_json::from_str(&body).map_err(|e| {
                ApiError::transport(format!("Failed to deserialize extension response: {e}"))
            })
        }
        .instrument(span)
        .await
    }

    async fn get(
        &self,
        resource_group: &str,
        vm_name: &str,
        name: &str,
        expand: Option<&str>,
    ) -> Result<VirtualMachineExtension, ApiError> {
        let span = tracing::debug_span!(
            "azure.compute.extension.get",
            extension.name = name,
            vm.name = vm_name,
            resource_group = resource_group
        );

        async move {
            let url = self.extension_url(resource_group, vm_name, name);
            let mut query = vec![("api-version", self.api_version.as_str())];
            if let Some(expand) = expand.filter(|e| !e.is_empty()) {
                query.push(("$expand", expand));
            }
            let request = self.request(Method::GET, &url).await?.query(&query);
            let response = Self::send(request).await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }
            response.json().await.map_err(|e| {
                ApiError::transport(format!("Failed to deserialize extension response: {e}"))
            })
        }
        .instrument(span)
        .await
    }

    async fn delete(
        &self,
        resource_group: &str,
        vm_name: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        let span = tracing::debug_span!(
            "azure.compute.extension.delete",
            extension.name = name,
            vm.name = vm_name,
            resource_group = resource_group
        );

        async move {
            let url = self.extension_url(resource_group, vm_name, name);
            let request = self
                .request(Method::DELETE, &url)
                .await?
                .query(&[("api-version", self.api_version.as_str())]);
            let response = Self::send(request).await?;
            match response.status() {
                StatusCode::ACCEPTED => self.wait_for_completion(response.headers()).await,
                status if status.is_success() => Ok(()),
                _ => Err(error_from_response(response).await),
            }
        }
        .instrument(span)
        .await
    }
}

/// Progress reported by a `Location` poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocationPoll {
    Pending,
    Done,
    Failed,
}

impl LocationPoll {
    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::ACCEPTED => Self::Pending,
            status if status.is_success() => Self::Done,
            _ => Self::Failed,
        }
    }
}

/// A PUT is still running when ARM hands back a status URL or answers 202
fn is_long_running(status: StatusCode, headers: &HeaderMap) -> bool {
    status == StatusCode::ACCEPTED
        || header_value(headers, ASYNC_OPERATION_HEADER).is_some()
        || header_value(headers, reqwest::header::LOCATION.as_str()).is_some()
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Decode an ARM error envelope, falling back to the raw body
async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ArmErrorResponse>(&body) {
        Ok(envelope) => ApiError::new(
            Some(status),
            envelope.error.code,
            envelope.error.message.unwrap_or(body),
        ),
        Err(_) => ApiError::new(Some(status), None, body),
    }
}
