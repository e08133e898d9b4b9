//! # Virtual Machine Extension Resource
//!
//! Lifecycle callbacks for the `azurerm_virtual_machine_extension` resource.
//!
//! ## Operations
//!
//! - **create / update**: one code path. The full configuration is submitted
//!   with a create-or-update call, the canonical ID is fetched back, and the
//!   state is refreshed through read.
//! - **read**: refreshes every readable attribute from Azure. A missing
//!   extension clears the identity instead of failing, which the host reads as
//!   "recreate on next apply". `protected_settings` is never written back.
//! - **delete**: removes the extension. Remote failures are logged and
//!   ignored unless [`ResourceOptions::fail_on_delete_error`] is set.
//! - **import**: accepts an existing extension ID; the host follows up with read.

use crate::azure::tags::json_type_name;
use crate::azure::{expand_tags, flatten_tags, normalize_location, ExtensionId};
use crate::config::AdapterConfig;
use crate::error::{ExtensionError, Operation, Result};
use crate::observability::metrics;
use crate::provider::{
    VirtualMachineExtension, VirtualMachineExtensionProperties, VirtualMachineExtensionsClient,
};
use crate::schema::attributes::{
    AUTO_UPGRADE_MINOR_VERSION, LOCATION, NAME, PUBLISHER, RESOURCE_GROUP_NAME, SETTINGS, TAGS,
    TYPE, TYPE_HANDLER_VERSION, VIRTUAL_MACHINE_NAME,
};
use crate::schema::{ExtensionConfig, ResourceData};
use crate::settings::{parse_settings, render_settings};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{field, info, info_span, warn, Instrument, Span};

/// Span for one lifecycle operation; target fields are recorded once known
macro_rules! operation_span {
    ($name:literal) => {
        info_span!(
            $name,
            extension.name = field::Empty,
            resource_group = field::Empty,
            vm.name = field::Empty,
            operation.success = field::Empty,
            operation.duration_ms = field::Empty,
            error.message = field::Empty
        )
    };
}

/// Behaviour switches for the adapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceOptions {
    /// Return remote delete failures instead of logging and reporting success
    pub fail_on_delete_error: bool,
}

impl ResourceOptions {
    #[must_use]
    pub fn from_config(config: &AdapterConfig) -> Self {
        Self {
            fail_on_delete_error: config.fail_on_delete_error,
        }
    }
}

/// Resource adapter bound to a virtual machine extensions client
pub struct VirtualMachineExtensionResource<C: ?Sized> {
    client: Arc<C>,
    options: ResourceOptions,
}

impl<C: ?Sized> std::fmt::Debug for VirtualMachineExtensionResource<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualMachineExtensionResource")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<C> VirtualMachineExtensionResource<C>
where
    C: VirtualMachineExtensionsClient + ?Sized,
{
    pub fn new(client: Arc<C>, options: ResourceOptions) -> Self {
        Self { client, options }
    }

    /// Create the extension, or bring an existing one in line with `data`
    ///
    /// # Errors
    ///
    /// - `Validation` if the configuration or its settings JSON is invalid
    ///   (no remote call is made)
    /// - `Remote` if the create-or-update or the follow-up fetch fails
    /// - `Integrity` if Azure returns no ID for the extension
    /// - any error from the follow-up read
    pub async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let span = operation_span!("azure.vm_extension.create");
        let span_clone = span.clone();
        let start = Instant::now();
        let result = self.create_or_update(data).instrument(span).await;
        finish(Operation::Create, &span_clone, start, &result);
        result
    }

    /// Same code path as [`create`](Self::create); every attribute is resubmitted
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub async fn update(&self, data: &mut ResourceData) -> Result<()> {
        self.create(data).await
    }

    /// Refresh `data` from Azure
    ///
    /// # Errors
    ///
    /// - `Validation` if the stored ID is malformed
    /// - `Remote` for any failure other than not-found
    /// - `Serialization` if the returned settings are not a JSON object
    pub async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let span = operation_span!("azure.vm_extension.read");
        let span_clone = span.clone();
        let start = Instant::now();
        let result = self.read_state(data).instrument(span).await;
        finish(Operation::Read, &span_clone, start, &result);
        result
    }

    /// Remove the extension from Azure
    ///
    /// # Errors
    ///
    /// - `Validation` if the stored ID is malformed
    /// - `Remote` only when `fail_on_delete_error` is set
    pub async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let span = operation_span!("azure.vm_extension.delete");
        let span_clone = span.clone();
        let start = Instant::now();
        let result = self.delete_remote(data).instrument(span).await;
        finish(Operation::Delete, &span_clone, start, &result);
        result
    }

    /// Start managing an existing extension
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `id` is not a virtual machine extension ID.
    pub fn import(&self, id: &str) -> Result<ResourceData> {
        let parsed: ExtensionId = id.parse()?;
        info!(
            "Importing Virtual Machine Extension {} (virtual machine {}, resource group {})",
            parsed.name, parsed.virtual_machine_name, parsed.resource_group
        );
        Ok(ResourceData::with_id(id))
    }

    async fn create_or_update(&self, data: &mut ResourceData) -> Result<()> {
        let config = ExtensionConfig::decode(data)?;
        record_target(&config.name, &config.resource_group_name, &config.virtual_machine_name);

        let extension = build_extension(&config)?;
        let (name, resource_group, vm_name) = (
            config.name.as_str(),
            config.resource_group_name.as_str(),
            config.virtual_machine_name.as_str(),
        );

        info!(
            "Creating/updating Virtual Machine Extension {} on virtual machine {} (resource group {})",
            name, vm_name, resource_group
        );
        self.client
            .create_or_update(resource_group, vm_name, name, &extension)
            .await
            .map_err(|e| {
                ExtensionError::remote(
                    Operation::Create,
                    name,
                    format!(
                        "Error creating/updating Virtual Machine Extension {name} (resource group {resource_group})"
                    ),
                    e,
                )
            })?;

        let read = self
            .client
            .get(resource_group, vm_name, name, None)
            .await
            .map_err(|e| {
                ExtensionError::remote(
                    Operation::Create,
                    name,
                    format!(
                        "Error retrieving Virtual Machine Extension {name} (resource group {resource_group})"
                    ),
                    e,
                )
            })?;

        let id = read.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            ExtensionError::Integrity(format!(
                "Cannot read Virtual Machine Extension {name} (resource group {resource_group}) ID"
            ))
        })?;

        data.set_id(id);
        self.read_state(data).await
    }

    async fn read_state(&self, data: &mut ResourceData) -> Result<()> {
        let id: ExtensionId = data.id().unwrap_or_default().parse()?;
        record_target(&id.name, &id.resource_group, &id.virtual_machine_name);

        let response = match self
            .client
            .get(&id.resource_group, &id.virtual_machine_name, &id.name, None)
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                info!(
                    "Virtual Machine Extension {} no longer exists, removing from state",
                    id.name
                );
                metrics::increment_not_found();
                data.clear_id();
                return Ok(());
            }
            Err(e) => {
                return Err(ExtensionError::remote(
                    Operation::Read,
                    &id.name,
                    format!(
                        "Error making Read request on Virtual Machine Extension {}",
                        id.name
                    ),
                    e,
                ));
            }
        };

        apply_remote_state(data, &id, response)
    }

    async fn delete_remote(&self, data: &mut ResourceData) -> Result<()> {
        let id: ExtensionId = data.id().unwrap_or_default().parse()?;
        record_target(&id.name, &id.resource_group, &id.virtual_machine_name);

        info!(
            "Deleting Virtual Machine Extension {} from virtual machine {}",
            id.name, id.virtual_machine_name
        );
        match self
            .client
            .delete(&id.resource_group, &id.virtual_machine_name, &id.name)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                info!("Virtual Machine Extension {} was already deleted", id.name);
            }
            Err(e) if self.options.fail_on_delete_error => {
                return Err(ExtensionError::remote(
                    Operation::Delete,
                    &id.name,
                    format!("Error deleting Virtual Machine Extension {}", id.name),
                    e,
                ));
            }
            Err(e) => {
                warn!(
                    "Ignoring failure to delete Virtual Machine Extension {}: {}",
                    id.name, e
                );
                metrics::increment_delete_errors_suppressed();
            }
        }
        Ok(())
    }
}

/// Translate typed configuration into the ARM request body
///
/// # Errors
///
/// Returns `Validation` if settings or protected settings are not a JSON object.
pub fn build_extension(config: &ExtensionConfig) -> Result<VirtualMachineExtension> {
    let settings = config
        .settings
        .as_deref()
        .map(|text| {
            parse_settings(text)
                .map(Value::Object)
                .map_err(|e| ExtensionError::validation(format!("unable to parse settings: {e}")))
        })
        .transpose()?;

    let protected_settings = config
        .protected_settings
        .as_ref()
        .map(|secret| {
            parse_settings(secret.expose())
                .map(Value::Object)
                .map_err(|e| {
                    ExtensionError::validation(format!("unable to parse protected_settings: {e}"))
                })
        })
        .transpose()?;

    Ok(VirtualMachineExtension {
        location: Some(config.location.clone()),
        tags: expand_tags(&config.tags),
        properties: Some(VirtualMachineExtensionProperties {
            publisher: Some(config.publisher.clone()),
            extension_type: Some(config.extension_type.clone()),
            type_handler_version: Some(config.type_handler_version.clone()),
            auto_upgrade_minor_version: Some(config.auto_upgrade_minor_version),
            settings,
            protected_settings,
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Write the readable attributes of a fetched extension into `data`
fn apply_remote_state(
    data: &mut ResourceData,
    id: &ExtensionId,
    response: VirtualMachineExtension,
) -> Result<()> {
    let properties = response.properties.unwrap_or_default();

    data.set(NAME, response.name.unwrap_or_else(|| id.name.clone()));
    if let Some(location) = response.location.as_deref() {
        data.set(LOCATION, normalize_location(location));
    }
    data.set(VIRTUAL_MACHINE_NAME, id.virtual_machine_name.as_str());
    data.set(RESOURCE_GROUP_NAME, id.resource_group.as_str());
    data.set(PUBLISHER, properties.publisher.unwrap_or_default());
    data.set(TYPE, properties.extension_type.unwrap_or_default());
    data.set(
        TYPE_HANDLER_VERSION,
        properties.type_handler_version.unwrap_or_default(),
    );
    data.set(
        AUTO_UPGRADE_MINOR_VERSION,
        properties.auto_upgrade_minor_version.unwrap_or(false),
    );

    if let Some(settings) = properties.settings {
        let document = match settings {
            Value::Object(document) => document,
            Value::String(text) => parse_settings(&text).map_err(|e| {
                ExtensionError::serialization(format!(
                    "unable to parse settings from response: {e}"
                ))
            })?,
            other => {
                return Err(ExtensionError::serialization(format!(
                    "unable to parse settings from response: expected object, got {}",
                    json_type_name(&other)
                )));
            }
        };
        let rendered = render_settings(&document).map_err(|e| {
            ExtensionError::serialization(format!("unable to parse settings from response: {e}"))
        })?;
        data.set(SETTINGS, rendered);
    }

    data.set(TAGS, flatten_tags(response.tags.as_ref()));
    Ok(())
}

fn record_target(name: &str, resource_group: &str, vm_name: &str) {
    let span = Span::current();
    span.record("extension.name", name);
    span.record("resource_group", resource_group);
    span.record("vm.name", vm_name);
}

fn finish(operation: Operation, span: &Span, start: Instant, result: &Result<()>) {
    let elapsed = start.elapsed();
    metrics::record_operation(operation.as_str(), elapsed.as_secs_f64());
    span.record(
        "operation.duration_ms",
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    );
    span.record("operation.success", result.is_ok());
    if let Err(e) = result {
        span.record("error.message", e.to_string().as_str());
        metrics::increment_operation_errors(operation.as_str(), e.kind());
    }
}
