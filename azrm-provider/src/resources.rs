//! Resource type definitions
//!
//! Every resource type is an [`AzureResourceType`] wrapping its schema config;
//! the ID handling is shared and driven by the config's [`IdSource`].

use std::collections::HashMap;

use azrm_core::provider::{ProviderError, ProviderResult, ResourceType, Timeouts};
use azrm_core::resource::Value;
use azrm_core::resource_id::{ResourceId, ResourceIdSchema};
use azrm_core::schema::ResourceSchema;

use crate::config::ProviderConfig;
use crate::schemas::{AzureSchemaConfig, IdSource, configs};

/// A resource type backed by an [`AzureSchemaConfig`]
#[derive(Debug, Clone)]
pub struct AzureResourceType {
    config: AzureSchemaConfig,
}

impl AzureResourceType {
    pub fn new(config: AzureSchemaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AzureSchemaConfig {
        &self.config
    }
}

fn required_string<'a>(
    attributes: &'a HashMap<String, Value>,
    name: &str,
) -> ProviderResult<&'a str> {
    attributes
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::new(format!("`{}` must be set to build the resource ID", name)))
}

impl ResourceType for AzureResourceType {
    fn name(&self) -> &'static str {
        self.config.resource_type_name
    }

    fn schema(&self) -> ResourceSchema {
        self.config.schema.clone()
    }

    fn id_schema(&self) -> &'static ResourceIdSchema {
        self.config.id_schema
    }

    fn resource_id(
        &self,
        subscription_id: &str,
        attributes: &HashMap<String, Value>,
    ) -> ProviderResult<ResourceId> {
        let values = match self.config.id_source {
            IdSource::Attributes(names) => {
                let mut values = vec![subscription_id.to_string()];
                for name in names {
                    values.push(required_string(attributes, name)?.to_string());
                }
                values
            }
            // Children live in the parent's subscription
            IdSource::Parent { attribute, schema } => {
                let parent = schema.parse(required_string(attributes, attribute)?)?;
                let mut values = parent.into_values();
                values.push(required_string(attributes, "name")?.to_string());
                values
            }
        };
        let id = ResourceId::new(self.config.id_schema, values);
        // Surface empty values now rather than when the ID is formatted
        id.id()?;
        Ok(id)
    }

    fn id_attributes(&self, id: &ResourceId) -> HashMap<String, Value> {
        let mut attributes = HashMap::new();
        match self.config.id_source {
            IdSource::Attributes(names) => {
                for (name, value) in names.iter().zip(id.values().iter().skip(1)) {
                    attributes.insert(name.to_string(), Value::string(value));
                }
            }
            IdSource::Parent { attribute, schema } => {
                if let Some((name, parent_values)) = id.values().split_last() {
                    if let Ok(parent) = schema.format(parent_values) {
                        attributes.insert(attribute.to_string(), Value::String(parent));
                    }
                    attributes.insert("name".to_string(), Value::string(name));
                }
            }
        }
        attributes
    }

    fn timeouts(&self) -> Timeouts {
        self.config.timeouts
    }

    fn lock_name(&self, id: &ResourceId) -> Option<String> {
        self.config
            .lock_field
            .and_then(|field| id.get(field))
            .map(str::to_string)
    }
}

/// Returns all resource types supported by this provider
pub fn resource_types(config: &ProviderConfig) -> Vec<Box<dyn ResourceType>> {
    configs(config)
        .into_iter()
        .map(|c| Box::new(AzureResourceType::new(c)) as Box<dyn ResourceType>)
        .collect()
}

/// Look up one resource type by name
pub fn resource_type(config: &ProviderConfig, name: &str) -> Option<AzureResourceType> {
    configs(config)
        .into_iter()
        .find(|c| c.resource_type_name == name)
        .map(AzureResourceType::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use azrm_core::resource_id::ResourceIdError;

    const SUBSCRIPTION: &str = "12345678-1234-9876-4563-123456789012";

    fn lookup(name: &str) -> AzureResourceType {
        resource_type(&ProviderConfig::new(SUBSCRIPTION), name).unwrap()
    }

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::string(*v)))
            .collect()
    }

    #[test]
    fn cluster_id_from_attributes() {
        let t = lookup("azurerm_kusto_cluster");
        let id = t
            .resource_id(
                SUBSCRIPTION,
                &attrs(&[("resource_group_name", "rg"), ("name", "kustocluster")]),
            )
            .unwrap();
        assert_eq!(
            id.id().unwrap(),
            "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/rg/providers/Microsoft.Kusto/clusters/kustocluster"
        );
        assert_eq!(t.lock_name(&id), Some("kustocluster".to_string()));
        assert_eq!(
            t.id_attributes(&id),
            attrs(&[("resource_group_name", "rg"), ("name", "kustocluster")])
        );
    }

    #[test]
    fn principal_assignment_does_not_lock() {
        let t = lookup("azurerm_kusto_cluster_principal_assignment");
        let id = t
            .resource_id(
                SUBSCRIPTION,
                &attrs(&[
                    ("resource_group_name", "rg"),
                    ("cluster_name", "kustocluster"),
                    ("name", "admin"),
                ]),
            )
            .unwrap();
        assert!(id.id().unwrap().ends_with("/clusters/kustocluster/principalAssignments/admin"));
        assert_eq!(t.lock_name(&id), None);
    }

    #[test]
    fn attached_database_configuration_does_not_lock() {
        let t = lookup("azurerm_kusto_attached_database_configuration");
        let id = t
            .resource_id(
                SUBSCRIPTION,
                &attrs(&[
                    ("resource_group_name", "rg"),
                    ("cluster_name", "kustocluster"),
                    ("name", "follower1"),
                ]),
            )
            .unwrap();
        assert_eq!(t.lock_name(&id), None);
    }

    #[test]
    fn certificate_id_from_parent() {
        let t = lookup("azurerm_container_app_environment_certificate");
        let env = "/subscriptions/other/resourceGroups/rg/providers/Microsoft.App/managedEnvironments/env1";
        let given = attrs(&[("container_app_environment_id", env), ("name", "cert1")]);
        let id = t.resource_id(SUBSCRIPTION, &given).unwrap();
        assert_eq!(id.id().unwrap(), format!("{}/certificates/cert1", env));
        assert_eq!(t.id_attributes(&id), given);
        assert_eq!(t.lock_name(&id), None);
    }

    #[test]
    fn parent_of_the_wrong_type_is_rejected() {
        let t = lookup("azurerm_network_manager_connectivity_configuration");
        let err = t
            .resource_id(
                SUBSCRIPTION,
                &attrs(&[
                    (
                        "network_manager_id",
                        "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Kusto/clusters/c",
                    ),
                    ("name", "conf1"),
                ]),
            )
            .unwrap_err();
        assert!(err.to_string().starts_with("parsing resource ID"));
    }

    #[test]
    fn missing_and_empty_values() {
        let t = lookup("azurerm_video_analyzer");
        let err = t
            .resource_id(SUBSCRIPTION, &attrs(&[("name", "analyzer1")]))
            .unwrap_err();
        assert!(err.to_string().contains("resource_group_name"));

        let err = t
            .resource_id(
                "",
                &attrs(&[("resource_group_name", "rg"), ("name", "analyzer1")]),
            )
            .unwrap_err();
        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert_eq!(
            cause,
            ResourceIdError::IncompleteIdentifier {
                field: "subscriptionId"
            }
            .to_string()
        );
    }

    #[test]
    fn import_validation_uses_the_id_schema() {
        let t = lookup("azurerm_kusto_attached_database_configuration");
        let valid = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Kusto/clusters/c1/attachedDatabaseConfigurations/follower";
        assert!(t.validate_import(valid).is_ok());
        assert!(
            t.validate_import("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Kusto/clusters/c1")
                .is_err()
        );
    }

    #[test]
    fn every_type_is_listed() {
        let types = resource_types(&ProviderConfig::default());
        let names: Vec<_> = types.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "azurerm_video_analyzer",
                "azurerm_container_app_environment_certificate",
                "azurerm_kusto_cluster",
                "azurerm_kusto_attached_database_configuration",
                "azurerm_kusto_cluster_principal_assignment",
                "azurerm_network_manager_connectivity_configuration",
            ]
        );
    }
}
