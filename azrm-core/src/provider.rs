//! Provider - Trait abstracting resource operations
//!
//! A Provider defines CRUD operations for a set of resource types and is
//! responsible for converting them into management API calls.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::resource::{Resource, ResourceAddress, State, Value};
use crate::resource_id::{ResourceId, ResourceIdError, ResourceIdSchema};
use crate::schema::ResourceSchema;

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub address: Option<ResourceAddress>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref address) = self.address {
            write!(f, "[{}] {}", address, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(ref cause) = self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            address: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, address: ResourceAddress) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl From<ResourceIdError> for ProviderError {
    fn from(err: ResourceIdError) -> Self {
        ProviderError::new("parsing resource ID").with_cause(err)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Upper bounds for each CRUD operation on a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Timeouts {
    /// Same bound for create, update and delete; reads get `read`
    pub const fn mutating(minutes: u64, read_minutes: u64) -> Self {
        Self {
            create: Duration::from_secs(minutes * 60),
            read: Duration::from_secs(read_minutes * 60),
            update: Duration::from_secs(minutes * 60),
            delete: Duration::from_secs(minutes * 60),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::mutating(30, 5)
    }
}

/// Definition of a resource type that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type name (e.g., "azurerm_kusto_cluster")
    fn name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema;

    /// Shape of this resource type's ID
    fn id_schema(&self) -> &'static ResourceIdSchema;

    /// Build the resource ID from configuration
    fn resource_id(
        &self,
        subscription_id: &str,
        attributes: &HashMap<String, Value>,
    ) -> ProviderResult<ResourceId>;

    /// Attributes recovered from a parsed resource ID (e.g., name, resource group)
    fn id_attributes(&self, id: &ResourceId) -> HashMap<String, Value>;

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    /// Name of the lock serializing mutations of this resource, if any
    fn lock_name(&self, _id: &ResourceId) -> Option<String> {
        None
    }

    /// Check an ID given to `import` before anything is read
    fn validate_import(&self, id: &str) -> Result<(), ResourceIdError> {
        self.id_schema().validate(id)
    }
}

/// Main Provider trait
///
/// All operations are async and involve side effects.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "azurerm")
    fn name(&self) -> &'static str;

    /// List of resource types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Get the current state of a resource
    ///
    /// Returns `State::not_found()` if there is no identifier or the resource
    /// no longer exists, which removes it from state.
    fn read(
        &self,
        address: &ResourceAddress,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Create a resource
    ///
    /// Returns State with identifier set to the formatted resource ID
    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Update a resource in place
    fn update(
        &self,
        address: &ResourceAddress,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Delete a resource
    fn delete(
        &self,
        address: &ResourceAddress,
        identifier: &str,
    ) -> BoxFuture<'_, ProviderResult<()>>;

    /// Bring an existing resource under management by its ID
    fn import(
        &self,
        address: &ResourceAddress,
        identifier: &str,
    ) -> BoxFuture<'_, ProviderResult<State>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn read(
        &self,
        address: &ResourceAddress,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read(address, identifier)
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).create(resource)
    }

    fn update(
        &self,
        address: &ResourceAddress,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).update(address, identifier, from, to)
    }

    fn delete(
        &self,
        address: &ResourceAddress,
        identifier: &str,
    ) -> BoxFuture<'_, ProviderResult<()>> {
        (**self).delete(address, identifier)
    }

    fn import(
        &self,
        address: &ResourceAddress,
        identifier: &str,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).import(address, identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mock Provider for testing
    struct MockProvider;

    impl Provider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn read(
            &self,
            address: &ResourceAddress,
            _identifier: Option<&str>,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            let address = address.clone();
            Box::pin(async move { Ok(State::not_found(address)) })
        }

        fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let address = resource.address.clone();
            let attrs = resource.attributes.clone();
            Box::pin(async move {
                Ok(State::existing(address, attrs).with_identifier("/subscriptions/mock"))
            })
        }

        fn update(
            &self,
            address: &ResourceAddress,
            _identifier: &str,
            _from: &State,
            to: &Resource,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            let address = address.clone();
            let attrs = to.attributes.clone();
            Box::pin(async move { Ok(State::existing(address, attrs)) })
        }

        fn delete(
            &self,
            _address: &ResourceAddress,
            _identifier: &str,
        ) -> BoxFuture<'_, ProviderResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn import(
            &self,
            address: &ResourceAddress,
            identifier: &str,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            self.read(address, Some(identifier))
        }
    }

    #[tokio::test]
    async fn mock_provider_read_returns_not_found() {
        let provider: Box<dyn Provider> = Box::new(MockProvider);
        let address = ResourceAddress::new("test", "example");
        let state = provider.read(&address, None).await.unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn mock_provider_create_returns_existing() {
        let provider = MockProvider;
        let resource = Resource::new("test", "example");
        let state = provider.create(&resource).await.unwrap();
        assert!(state.exists);
        assert_eq!(state.identifier, Some("/subscriptions/mock".to_string()));
    }

    #[test]
    fn error_display_includes_address_and_cause() {
        let err = ProviderError::from(ResourceIdError::MissingSegment {
            field: "clusterName",
            position: 8,
        })
        .for_resource(ResourceAddress::new("azurerm_kusto_cluster", "main"));
        assert_eq!(
            err.to_string(),
            "[azurerm_kusto_cluster.main] parsing resource ID: segment 8: missing value for `clusterName`"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn default_timeouts() {
        let t = Timeouts::mutating(60, 5);
        assert_eq!(t.create, Duration::from_secs(3600));
        assert_eq!(t.read, Duration::from_secs(300));
    }
}
