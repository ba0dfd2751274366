//! Azure Resource Manager Provider implementation
//!
//! This module contains the main provider implementation that drives a
//! [`ManagementClient`] to manage resources.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use azrm_core::lock::{NamedLockGuard, NamedLocks};
use azrm_core::provider::{ProviderError, ProviderResult, ResourceType};
use azrm_core::resource::{Resource, ResourceAddress, State, Value};
use azrm_core::resource_id::ResourceId;
use log::{debug, info, warn};
use serde_json::{Value as JsonValue, json};

use crate::client::{
    ADD_LANGUAGE_EXTENSIONS, ClientError, LIST_LANGUAGE_EXTENSIONS, ManagementClient,
    REMOVE_LANGUAGE_EXTENSIONS,
};
use crate::config::ProviderConfig;
use crate::ids::ManagedEnvironmentId;
use crate::kusto::{AutoScale, diff_language_extensions, sku_tier};
use crate::resources::{AzureResourceType, resource_type};
use crate::utils::{
    expand_attributes, expand_identity, flatten_attributes, flatten_identity, get_path,
    normalize_location, set_path,
};

/// Azure Resource Manager Provider
pub struct AzureProvider {
    client: Arc<dyn ManagementClient>,
    config: ProviderConfig,
    locks: NamedLocks,
}

impl AzureProvider {
    pub fn new(client: Arc<dyn ManagementClient>, config: ProviderConfig) -> Self {
        Self {
            client,
            config,
            locks: NamedLocks::new(),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn resource_type(&self, address: &ResourceAddress) -> ProviderResult<AzureResourceType> {
        resource_type(&self.config, &address.resource_type).ok_or_else(|| {
            ProviderError::new(format!("Unknown resource type: {}", address.resource_type))
                .for_resource(address.clone())
        })
    }

    // =========================================================================
    // Client Calls
    // =========================================================================

    /// Run one client call bounded by `limit`
    async fn call<T>(
        &self,
        limit: Duration,
        operation: &str,
        id: &str,
        request: impl Future<Output = Result<T, ClientError>>,
    ) -> ProviderResult<T> {
        debug!("{} {}", operation, id);
        match tokio::time::timeout(limit, request).await {
            Ok(result) => result.map_err(|e| {
                ProviderError::new(format!("{} {}", operation, id)).with_cause(e)
            }),
            Err(_) => Err(ProviderError::new(format!(
                "{} {} timed out after {:?}",
                operation, id, limit
            ))),
        }
    }

    async fn lock(
        &self,
        resource_type: &AzureResourceType,
        id: &ResourceId,
    ) -> Option<NamedLockGuard> {
        match resource_type.lock_name(id) {
            Some(name) => Some(self.locks.lock(&name).await),
            None => None,
        }
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Read a resource by its identifier
    pub async fn read_resource(
        &self,
        address: &ResourceAddress,
        identifier: Option<&str>,
    ) -> ProviderResult<State> {
        let resource_type = self.resource_type(address)?;

        let identifier = match identifier {
            Some(id) => id,
            None => return Ok(State::not_found(address.clone())),
        };

        let id = resource_type
            .id_schema()
            .parse(identifier)
            .map_err(|e| ProviderError::from(e).for_resource(address.clone()))?;
        let formatted = id.id()?;

        let payload = match self
            .call(
                resource_type.timeouts().read,
                "retrieving",
                &formatted,
                self.client.get(&formatted),
            )
            .await
            .map_err(|e| e.for_resource(address.clone()))?
        {
            Some(payload) => payload,
            None => {
                warn!("{} was not found - removing from state", id);
                return Ok(State::not_found(address.clone()));
            }
        };

        let schema = resource_type.schema();
        let mut attributes = flatten_attributes(&schema, &payload);
        attributes.extend(resource_type.id_attributes(&id));
        self.read_special_attributes(resource_type.name(), &payload, &mut attributes);

        Ok(State::existing(address.clone(), attributes).with_identifier(formatted))
    }

    /// Create a resource, failing if it already exists
    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        let address = &resource.address;
        let resource_type = self.resource_type(address)?;
        let attributes = self
            .prepare_attributes(&resource_type, resource)
            .map_err(|e| e.for_resource(address.clone()))?;

        info!("preparing arguments for {} creation", address);
        let id = resource_type
            .resource_id(&self.config.subscription_id, &attributes)
            .map_err(|e| e.for_resource(address.clone()))?;
        let formatted = id.id()?;
        let timeouts = resource_type.timeouts();

        let existing = self
            .call(
                timeouts.read,
                "checking for presence of existing",
                &formatted,
                self.client.get(&formatted),
            )
            .await
            .map_err(|e| e.for_resource(address.clone()))?;
        if existing.is_some() {
            return Err(ProviderError::new(format!(
                "A resource with the ID {:?} already exists - to be managed this resource needs to be imported into the State",
                formatted
            ))
            .for_resource(address.clone()));
        }

        let _guard = self.lock(&resource_type, &id).await;
        self.write_resource(&resource_type, &id, &attributes, timeouts.create)
            .await
            .map_err(|e| e.for_resource(address.clone()))?;

        self.read_back(&resource_type, address, &formatted, &attributes)
            .await
    }

    /// Update a resource in place
    pub async fn update_resource(
        &self,
        address: &ResourceAddress,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let resource_type = self.resource_type(address)?;
        let id = resource_type
            .id_schema()
            .parse(identifier)
            .map_err(|e| ProviderError::from(e).for_resource(address.clone()))?;
        let formatted = id.id()?;

        let configured = self
            .prepare_attributes(&resource_type, to)
            .map_err(|e| e.for_resource(address.clone()))?;

        let replaced = resource_type
            .schema()
            .force_new_changes(&from.attributes, &configured);
        if !replaced.is_empty() {
            return Err(ProviderError::new(format!(
                "changing {} requires replacing the resource",
                replaced
                    .iter()
                    .map(|name| format!("`{}`", name))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
            .for_resource(address.clone()));
        }
        self.check_update(resource_type.name(), from, &to.attributes)
            .map_err(|e| e.for_resource(address.clone()))?;

        let mut attributes = configured;
        attributes.extend(resource_type.id_attributes(&id));

        let _guard = self.lock(&resource_type, &id).await;
        self.write_resource(
            &resource_type,
            &id,
            &attributes,
            resource_type.timeouts().update,
        )
        .await
        .map_err(|e| e.for_resource(address.clone()))?;

        self.read_back(&resource_type, address, &formatted, &attributes)
            .await
    }

    /// Delete a resource
    pub async fn delete_resource(
        &self,
        address: &ResourceAddress,
        identifier: &str,
    ) -> ProviderResult<()> {
        let resource_type = self.resource_type(address)?;
        let id = resource_type
            .id_schema()
            .parse(identifier)
            .map_err(|e| ProviderError::from(e).for_resource(address.clone()))?;
        let formatted = id.id()?;

        let _guard = self.lock(&resource_type, &id).await;
        self.call(
            resource_type.timeouts().delete,
            "deleting",
            &formatted,
            self.client.delete(&formatted),
        )
        .await
        .map_err(|e| e.for_resource(address.clone()))
    }

    /// Import an existing resource by its ID
    pub async fn import_resource(
        &self,
        address: &ResourceAddress,
        identifier: &str,
    ) -> ProviderResult<State> {
        let resource_type = self.resource_type(address)?;
        resource_type
            .validate_import(identifier)
            .map_err(|e| ProviderError::from(e).for_resource(address.clone()))?;

        let state = self.read_resource(address, Some(identifier)).await?;
        if !state.exists {
            return Err(ProviderError::new(format!(
                "cannot import non-existent remote object {:?}",
                identifier
            ))
            .for_resource(address.clone()));
        }
        Ok(state)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Apply defaults, validate and normalize the configured attributes
    fn prepare_attributes(
        &self,
        resource_type: &AzureResourceType,
        resource: &Resource,
    ) -> ProviderResult<HashMap<String, Value>> {
        let schema = resource_type.schema();
        let mut attributes = resource.attributes.clone();
        schema.apply_defaults(&mut attributes);
        schema.validate(&attributes).map_err(|errors| {
            ProviderError::new(format!(
                "invalid configuration: {}",
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            ))
        })?;

        if let Some(Value::String(location)) = attributes.get_mut("location") {
            *location = normalize_location(location);
        }
        self.prepare_special_attributes(resource_type.name(), &mut attributes)?;
        Ok(attributes)
    }

    /// Send the payload built from `attributes`, then run follow-up actions
    async fn write_resource(
        &self,
        resource_type: &AzureResourceType,
        id: &ResourceId,
        attributes: &HashMap<String, Value>,
        limit: Duration,
    ) -> ProviderResult<()> {
        let formatted = id.id()?;
        let mut payload = expand_attributes(&resource_type.schema(), attributes);
        self.create_special_attributes(resource_type, id, attributes, &mut payload)
            .await?;

        self.call(
            limit,
            "creating/updating",
            &formatted,
            self.client
                .create_or_update(&formatted, JsonValue::Object(payload)),
        )
        .await?;

        // Installed extensions are left alone unless some are configured
        let has_extensions = attributes
            .get("language_extensions")
            .and_then(Value::as_list)
            .is_some_and(|extensions| !extensions.is_empty());
        if resource_type.name() == "azurerm_kusto_cluster" && has_extensions {
            self.sync_language_extensions(&formatted, attributes, limit)
                .await?;
        }
        Ok(())
    }

    /// Read the resource after a write, keeping secrets the API never returns
    async fn read_back(
        &self,
        resource_type: &AzureResourceType,
        address: &ResourceAddress,
        identifier: &str,
        desired: &HashMap<String, Value>,
    ) -> ProviderResult<State> {
        let mut state = self.read_resource(address, Some(identifier)).await?;
        if !state.exists {
            return Err(ProviderError::new(format!(
                "{} was not found after it was written",
                identifier
            ))
            .for_resource(address.clone()));
        }
        for attr in resource_type.schema().attributes.values() {
            if attr.sensitive
                && let Some(value) = desired.get(&attr.name)
            {
                state.attributes.insert(attr.name.clone(), value.clone());
            }
        }
        Ok(state)
    }

    // =========================================================================
    // Special Case Handlers
    // =========================================================================

    /// Checks and adjustments that go beyond the attribute schema
    fn prepare_special_attributes(
        &self,
        resource_type: &str,
        attributes: &mut HashMap<String, Value>,
    ) -> ProviderResult<()> {
        match resource_type {
            "azurerm_kusto_cluster" => {
                let scale = attributes
                    .get("optimized_auto_scale")
                    .and_then(Value::as_map)
                    .and_then(AutoScale::from_block);
                if let Some(scale) = scale {
                    scale.validate().map_err(ProviderError::new)?;
                    if let Some(Value::Map(sku)) = attributes.get_mut("sku") {
                        let requested = sku.get("capacity").and_then(Value::as_int);
                        sku.insert(
                            "capacity".to_string(),
                            Value::Int(scale.clamp_capacity(requested)),
                        );
                    }
                }
            }
            "azurerm_network_manager_connectivity_configuration" => {
                let hub_and_spoke =
                    attributes.get("connectivity_topology") == Some(&Value::string("HubAndSpoke"));
                let has_hub = attributes
                    .get("hub")
                    .and_then(Value::as_list)
                    .is_some_and(|hubs| !hubs.is_empty());
                if hub_and_spoke && !has_hub {
                    return Err(ProviderError::new(
                        "`hub` must be set when `connectivity_topology` is `HubAndSpoke`",
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Reject updates the API cannot apply in place
    fn check_update(
        &self,
        resource_type: &str,
        from: &State,
        to: &HashMap<String, Value>,
    ) -> ProviderResult<()> {
        if resource_type == "azurerm_kusto_cluster" && to.contains_key("optimized_auto_scale") {
            let capacity = |attrs: &HashMap<String, Value>| {
                attrs
                    .get("sku")
                    .and_then(Value::as_map)
                    .and_then(|sku| sku.get("capacity"))
                    .and_then(Value::as_int)
            };
            // State holds the capacity clamped into the range applied last time
            let applied_range = from
                .attributes
                .get("optimized_auto_scale")
                .and_then(Value::as_map)
                .and_then(AutoScale::from_block);
            if let Some(wanted) = capacity(to) {
                let effective = match applied_range {
                    Some(range) => range.clamp_capacity(Some(wanted)),
                    None => wanted,
                };
                if capacity(&from.attributes) != Some(effective) {
                    return Err(ProviderError::new(
                        "cannot change `sku.capacity` when `optimized_auto_scale` is set",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Handle payload properties that don't follow the standard mapping
    async fn create_special_attributes(
        &self,
        resource_type: &AzureResourceType,
        id: &ResourceId,
        attributes: &HashMap<String, Value>,
        payload: &mut serde_json::Map<String, JsonValue>,
    ) -> ProviderResult<()> {
        match resource_type.name() {
            "azurerm_kusto_cluster" => {
                if let Some(sku_name) = attributes
                    .get("sku")
                    .and_then(Value::as_map)
                    .and_then(|sku| sku.get("name"))
                    .and_then(Value::as_str)
                {
                    let tier = sku_tier(sku_name).map_err(ProviderError::new)?;
                    set_path(payload, "sku.tier", json!(tier));
                }
                if attributes.contains_key("optimized_auto_scale") {
                    set_path(payload, "properties.optimizedAutoscale.version", json!(1));
                    set_path(payload, "properties.optimizedAutoscale.isEnabled", json!(true));
                }
                let public = attributes
                    .get("public_network_access_enabled")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                set_path(
                    payload,
                    "properties.publicNetworkAccess",
                    json!(if public { "Enabled" } else { "Disabled" }),
                );
                if let Some(tenants) = attributes
                    .get("trusted_external_tenants")
                    .and_then(Value::as_list)
                {
                    let tenants: Vec<JsonValue> = tenants
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|t| json!({ "value": t }))
                        .collect();
                    set_path(payload, "properties.trustedExternalTenants", json!(tenants));
                }
                if let Some(identity) = attributes.get("identity").and_then(Value::as_map) {
                    payload.insert("identity".to_string(), expand_identity(identity));
                }
            }
            "azurerm_video_analyzer" => {
                if let Some(identity) = attributes.get("identity").and_then(Value::as_map) {
                    payload.insert("identity".to_string(), expand_identity(identity));
                }
            }
            "azurerm_container_app_environment_certificate" => {
                // Certificates take the location of their environment
                let env_id = ManagedEnvironmentId::new(
                    id.get("subscriptionId").unwrap_or_default(),
                    id.get("resourceGroupName").unwrap_or_default(),
                    id.get("environmentName").unwrap_or_default(),
                )
                .id()?;
                let environment = self
                    .call(
                        resource_type.timeouts().read,
                        "reading",
                        &env_id,
                        self.client.get(&env_id),
                    )
                    .await?
                    .ok_or_else(|| {
                        ProviderError::new(format!("reading {}: not found", env_id))
                    })?;
                if let Some(location) = environment.get("location") {
                    payload.insert("location".to_string(), location.clone());
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle attributes that don't follow the standard mapping
    fn read_special_attributes(
        &self,
        resource_type: &str,
        payload: &JsonValue,
        attributes: &mut HashMap<String, Value>,
    ) {
        match resource_type {
            "azurerm_kusto_cluster" => {
                let enabled = get_path(payload, "properties.optimizedAutoscale.isEnabled")
                    .and_then(JsonValue::as_bool);
                if enabled != Some(true) {
                    attributes.remove("optimized_auto_scale");
                }
                if let Some(access) =
                    get_path(payload, "properties.publicNetworkAccess").and_then(JsonValue::as_str)
                {
                    attributes.insert(
                        "public_network_access_enabled".to_string(),
                        Value::Bool(access.eq_ignore_ascii_case("Enabled")),
                    );
                }
                if let Some(tenants) =
                    get_path(payload, "properties.trustedExternalTenants").and_then(JsonValue::as_array)
                {
                    let tenants = tenants
                        .iter()
                        .filter_map(|t| t.get("value").and_then(JsonValue::as_str))
                        .map(Value::string)
                        .collect();
                    attributes.insert("trusted_external_tenants".to_string(), Value::List(tenants));
                }
                let extensions = language_extension_names(
                    get_path(payload, "properties.languageExtensions").unwrap_or(&JsonValue::Null),
                );
                if !extensions.is_empty() {
                    attributes.insert(
                        "language_extensions".to_string(),
                        Value::List(extensions.into_iter().map(Value::String).collect()),
                    );
                }
                if let Some(identity) = payload.get("identity").and_then(flatten_identity) {
                    attributes.insert("identity".to_string(), identity);
                }
            }
            "azurerm_video_analyzer" => {
                if let Some(identity) = payload.get("identity").and_then(flatten_identity) {
                    attributes.insert("identity".to_string(), identity);
                }
            }
            _ => {}
        }
    }

    /// Add and remove language extensions so the cluster has exactly those configured
    async fn sync_language_extensions(
        &self,
        id: &str,
        attributes: &HashMap<String, Value>,
        limit: Duration,
    ) -> ProviderResult<()> {
        let desired: Vec<String> = attributes
            .get("language_extensions")
            .and_then(Value::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();

        let listed = self
            .call(
                limit,
                "retrieving the language extensions on",
                id,
                self.client
                    .invoke_action(id, LIST_LANGUAGE_EXTENSIONS, JsonValue::Null),
            )
            .await?;
        let current = language_extension_names(&listed);

        let to_add = diff_language_extensions(&desired, &current);
        if !to_add.is_empty() {
            self.call(
                limit,
                "adding language extensions to",
                id,
                self.client
                    .invoke_action(id, ADD_LANGUAGE_EXTENSIONS, language_extensions_body(&to_add)),
            )
            .await?;
        }

        let to_remove = diff_language_extensions(&current, &desired);
        if !to_remove.is_empty() {
            self.call(
                limit,
                "removing language extensions from",
                id,
                self.client.invoke_action(
                    id,
                    REMOVE_LANGUAGE_EXTENSIONS,
                    language_extensions_body(&to_remove),
                ),
            )
            .await?;
        }
        Ok(())
    }
}

fn language_extension_names(list: &JsonValue) -> Vec<String> {
    list.get("value")
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("languageExtensionName"))
                .filter_map(JsonValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn language_extensions_body(names: &[String]) -> JsonValue {
    let items: Vec<JsonValue> = names
        .iter()
        .map(|name| json!({ "languageExtensionName": name }))
        .collect();
    json!({ "value": items })
}
