//! Network Manager schema definitions

use azrm_core::provider::Timeouts;
use azrm_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{AzureSchemaConfig, IdSource, enum_type, name_attribute};
use crate::ids::{NetworkManagerConnectivityConfigurationId, NetworkManagerId};
use crate::validate;

/// Returns the schema config for azurerm_network_manager_connectivity_configuration
pub fn connectivity_configuration_config() -> AzureSchemaConfig {
    AzureSchemaConfig {
        resource_type_name: "azurerm_network_manager_connectivity_configuration",
        id_schema: NetworkManagerConnectivityConfigurationId::schema(),
        id_source: IdSource::Parent {
            attribute: "network_manager_id",
            schema: NetworkManagerId::schema(),
        },
        timeouts: Timeouts::mutating(30, 5),
        lock_field: None,
        schema: ResourceSchema::new("azurerm_network_manager_connectivity_configuration")
            .with_description("Manages a Network Manager Connectivity Configuration")
            .attribute(name_attribute(validate::types::network_manager_child_name()))
            .attribute(
                AttributeSchema::new("network_manager_id", validate::types::network_manager_id())
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("connectivity_topology", enum_type(&["HubAndSpoke", "Mesh"]))
                    .required()
                    .with_provider_name("properties.connectivityTopology"),
            )
            .attribute(
                AttributeSchema::new(
                    "applies_to_group",
                    AttributeType::List(Box::new(AttributeType::Block(vec![
                        AttributeSchema::new("network_group_id", types::resource_id())
                            .required()
                            .with_provider_name("networkGroupId"),
                        AttributeSchema::new(
                            "group_connectivity",
                            enum_type(&["None", "DirectlyConnected"]),
                        )
                        .with_provider_name("groupConnectivity"),
                    ]))),
                )
                .required()
                .with_provider_name("properties.appliesToGroups"),
            )
            .attribute(
                AttributeSchema::new(
                    "hub",
                    AttributeType::List(Box::new(AttributeType::Block(vec![
                        AttributeSchema::new("resource_id", types::resource_id())
                            .required()
                            .with_provider_name("resourceId"),
                        AttributeSchema::new("resource_type", types::non_empty_string())
                            .required()
                            .with_provider_name("resourceType"),
                    ]))),
                )
                .with_description("Required when `connectivity_topology` is `HubAndSpoke`")
                .with_provider_name("properties.hubs"),
            )
            .attribute(
                AttributeSchema::new("description", AttributeType::String)
                    .with_provider_name("properties.description"),
            ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azrm_core::resource::Value;
    use std::collections::HashMap;

    #[test]
    fn topology_must_be_known() {
        let schema = connectivity_configuration_config().schema;
        let attr = &schema.attributes["connectivity_topology"];
        assert!(attr.attr_type.validate(&Value::string("Mesh")).is_ok());
        assert!(attr.attr_type.validate(&Value::string("Star")).is_err());
    }

    #[test]
    fn applies_to_group_needs_only_the_group_id() {
        let schema = connectivity_configuration_config().schema;
        let group = Value::List(vec![Value::Map(HashMap::from([(
            "network_group_id".to_string(),
            Value::string(
                "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/networkManagers/nm/networkGroups/g1",
            ),
        )]))]);
        assert!(
            schema.attributes["applies_to_group"]
                .attr_type
                .validate(&group)
                .is_ok()
        );
    }
}
