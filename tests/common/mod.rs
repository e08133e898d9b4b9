//! Common test utilities
//!
//! Provides rustls crypto provider setup for the Pact tests and an in-memory
//! virtual machine extensions client for lifecycle tests.

#![allow(dead_code, reason = "Each test binary uses a different subset")]

use async_trait::async_trait;
use azurerm_vm_extension::provider::{
    ApiError, VirtualMachineExtension, VirtualMachineExtensionsClient,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, Once};

static RUSTLS_INIT: Once = Once::new();

pub const SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Initialize rustls crypto provider for tests
///
/// This must be called before any async operations that use rustls.
/// Uses a `Once` to ensure it's only called once across all tests.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

/// Canonical ID the fake assigns to an extension
pub fn extension_id(resource_group: &str, vm_name: &str, name: &str) -> String {
    format!(
        "/subscriptions/{SUBSCRIPTION_ID}/resourceGroups/{resource_group}/providers/Microsoft.Compute/virtualMachines/{vm_name}/extensions/{name}"
    )
}

/// Remote call observed by [`FakeExtensionsClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateOrUpdate {
        resource_group: String,
        vm_name: String,
        name: String,
        body: VirtualMachineExtension,
    },
    Get {
        resource_group: String,
        vm_name: String,
        name: String,
    },
    Delete {
        resource_group: String,
        vm_name: String,
        name: String,
    },
}

#[derive(Default)]
struct FakeState {
    extensions: HashMap<(String, String, String), VirtualMachineExtension>,
    calls: Vec<Call>,
    create_error: Option<ApiError>,
    get_error: Option<ApiError>,
    get_error_after_create: Option<ApiError>,
    delete_error: Option<ApiError>,
    omit_id: bool,
}

/// In-memory stand-in for the ARM extensions API
///
/// Behaves like ARM for the parts the adapter relies on: it assigns IDs,
/// never echoes `protectedSettings`, reports missing extensions as 404 and
/// normalizes locations the way ARM does.
#[derive(Default)]
pub struct FakeExtensionsClient {
    state: Mutex<FakeState>,
}

impl FakeExtensionsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn create_calls(&self) -> Vec<VirtualMachineExtension> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateOrUpdate { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, resource_group: &str, vm_name: &str, name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .extensions
            .contains_key(&key(resource_group, vm_name, name))
    }

    /// Remove an extension behind the adapter's back
    pub fn remove_remote(&self, resource_group: &str, vm_name: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .extensions
            .remove(&key(resource_group, vm_name, name));
    }

    /// Replace the settings Azure reports for an extension
    pub fn set_remote_settings(&self, resource_group: &str, vm_name: &str, name: &str, settings: Value) {
        let mut state = self.state.lock().unwrap();
        let extension = state
            .extensions
            .get_mut(&key(resource_group, vm_name, name))
            .expect("extension not stored");
        if let Some(properties) = extension.properties.as_mut() {
            properties.settings = Some(settings);
        }
    }

    pub fn fail_create(&self, error: ApiError) {
        self.state.lock().unwrap().create_error = Some(error);
    }

    pub fn fail_get(&self, error: ApiError) {
        self.state.lock().unwrap().get_error = Some(error);
    }

    /// Fail reads only once an extension has been written
    pub fn fail_get_after_create(&self, error: ApiError) {
        self.state.lock().unwrap().get_error_after_create = Some(error);
    }

    pub fn fail_delete(&self, error: ApiError) {
        self.state.lock().unwrap().delete_error = Some(error);
    }

    /// Return extensions without an ID, as a misbehaving API would
    pub fn omit_ids(&self) {
        self.state.lock().unwrap().omit_id = true;
    }
}

fn key(resource_group: &str, vm_name: &str, name: &str) -> (String, String, String) {
    (
        resource_group.to_string(),
        vm_name.to_string(),
        name.to_string(),
    )
}

#[async_trait]
impl VirtualMachineExtensionsClient for FakeExtensionsClient {
    async fn create_or_update(
        &self,
        resource_group: &str,
        vm_name: &str,
        name: &str,
        extension: &VirtualMachineExtension,
    ) -> Result<VirtualMachineExtension, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateOrUpdate {
            resource_group: resource_group.to_string(),
            vm_name: vm_name.to_string(),
            name: name.to_string(),
            body: extension.clone(),
        });
        if let Some(error) = state.create_error.clone() {
            return Err(error);
        }

        let mut stored = extension.clone();
        stored.id = (!state.omit_id).then(|| extension_id(resource_group, vm_name, name));
        stored.name = Some(name.to_string());
        stored.resource_type = Some("Microsoft.Compute/virtualMachines/extensions".to_string());
        stored.location = extension
            .location
            .as_deref()
            .map(|l| l.replace(' ', "").to_lowercase());
        if let Some(properties) = stored.properties.as_mut() {
            properties.protected_settings = None;
            properties.provisioning_state = Some("Succeeded".to_string());
        }
        state
            .extensions
            .insert(key(resource_group, vm_name, name), stored.clone());
        Ok(stored)
    }

    async fn get(
        &self,
        resource_group: &str,
        vm_name: &str,
        name: &str,
        _expand: Option<&str>,
    ) -> Result<VirtualMachineExtension, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Get {
            resource_group: resource_group.to_string(),
            vm_name: vm_name.to_string(),
            name: name.to_string(),
        });
        if let Some(error) = state.get_error.clone() {
            return Err(error);
        }
        let created = state
            .calls
            .iter()
            .any(|c| matches!(c, Call::CreateOrUpdate { .. }));
        if let Some(error) = state.get_error_after_create.clone().filter(|_| created) {
            return Err(error);
        }
        state
            .extensions
            .get(&key(resource_group, vm_name, name))
            .cloned()
            .ok_or_else(|| {
                ApiError::new(
                    Some(404),
                    Some("NotFound".to_string()),
                    format!("The Resource '{name}' was not found."),
                )
            })
    }

    async fn delete(
        &self,
        resource_group: &str,
        vm_name: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete {
            resource_group: resource_group.to_string(),
            vm_name: vm_name.to_string(),
            name: name.to_string(),
        });
        if let Some(error) = state.delete_error.clone() {
            return Err(error);
        }
        state.extensions.remove(&key(resource_group, vm_name, name));
        Ok(())
    }
}

/// Attributes of the reference CustomScript extension
pub fn custom_script_attributes() -> Map<String, Value> {
    match json!({
        "name": "ext1",
        "location": "West US",
        "resource_group_name": "rg1",
        "virtual_machine_name": "vm1",
        "publisher": "Microsoft.Azure.Extensions",
        "type": "CustomScript",
        "type_handler_version": "2.0",
        "settings": "{\"fileUris\":[]}"
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}
