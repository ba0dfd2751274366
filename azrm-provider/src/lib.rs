//! azrm Azure Resource Manager Provider
//!
//! Azure Resource Manager Provider implementation.
//!
//! ## Module Structure
//!
//! - `client` - Management API client trait and an in-memory implementation
//! - `config` - Provider configuration (subscription, feature flags)
//! - `ids` - Typed resource IDs
//! - `kusto` - Kusto cluster helpers (SKU tiers, autoscale, language extensions)
//! - `provider` - AzureProvider implementation
//! - `resources` - Resource type definitions
//! - `schemas` - Resource schemas and their ID/timeout/lock configuration
//! - `utils` - Payload mapping helpers
//! - `validate` - Name and ID validators

pub mod client;
pub mod config;
pub mod ids;
pub mod kusto;
pub mod provider;
pub mod resources;
pub mod schemas;
pub mod utils;
pub mod validate;

// Re-export main types
pub use client::{ClientError, InMemoryClient, ManagementClient};
pub use config::ProviderConfig;
pub use provider::AzureProvider;
pub use utils::normalize_location;

use azrm_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use azrm_core::resource::{Resource, ResourceAddress, State};

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for AzureProvider {
    fn name(&self) -> &'static str {
        "azurerm"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resources::resource_types(self.config())
    }

    fn read(
        &self,
        address: &ResourceAddress,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let address = address.clone();
        let identifier = identifier.map(|s| s.to_string());
        Box::pin(async move {
            self.read_resource(&address, identifier.as_deref())
                .await
        })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(
        &self,
        address: &ResourceAddress,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let address = address.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move {
            self.update_resource(&address, &identifier, &from, &to)
                .await
        })
    }

    fn delete(
        &self,
        address: &ResourceAddress,
        identifier: &str,
    ) -> BoxFuture<'_, ProviderResult<()>> {
        let address = address.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.delete_resource(&address, &identifier).await })
    }

    fn import(
        &self,
        address: &ResourceAddress,
        identifier: &str,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let address = address.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.import_resource(&address, &identifier).await })
    }
}
