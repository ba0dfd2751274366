//! Kusto (Azure Data Explorer) resource schemas

use azrm_core::provider::Timeouts;
use azrm_core::resource::Value;
use azrm_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{
    AzureSchemaConfig, IdSource, enum_type, location_attribute, name_attribute,
    resource_group_name_attribute, string_default, string_list, tags_attribute,
};
use crate::config::ProviderConfig;
use crate::ids::{AttachedDatabaseConfigurationId, ClusterId, ClusterPrincipalAssignmentId};
use crate::kusto::{ENGINE_TYPES, LANGUAGE_EXTENSIONS, SKU_NAMES, default_engine};
use crate::validate;

const KUSTO_TIMEOUTS: Timeouts = Timeouts::mutating(60, 5);

fn cluster_name_attribute() -> AttributeSchema {
    AttributeSchema::new("cluster_name", validate::types::kusto_cluster_name())
        .required()
        .force_new()
}

/// Returns the schema config for azurerm_kusto_cluster
pub fn cluster_config(config: &ProviderConfig) -> AzureSchemaConfig {
    AzureSchemaConfig {
        resource_type_name: "azurerm_kusto_cluster",
        id_schema: ClusterId::schema(),
        id_source: IdSource::Attributes(&["resource_group_name", "name"]),
        timeouts: KUSTO_TIMEOUTS,
        lock_field: Some("clusterName"),
        schema: ResourceSchema::new("azurerm_kusto_cluster")
            .with_description("Manages a Kusto (also known as Azure Data Explorer) Cluster")
            .attribute(name_attribute(validate::types::kusto_cluster_name()))
            .attribute(resource_group_name_attribute())
            .attribute(location_attribute())
            .attribute(
                AttributeSchema::new(
                    "sku",
                    AttributeType::Block(vec![
                        AttributeSchema::new("name", enum_type(SKU_NAMES))
                            .required()
                            .with_provider_name("name"),
                        AttributeSchema::new("capacity", types::int_between(1, 1000))
                            .with_provider_name("capacity"),
                    ]),
                )
                .required()
                .with_provider_name("sku"),
            )
            .attribute(
                AttributeSchema::new(
                    "trusted_external_tenants",
                    string_list(validate::types::trusted_tenant()),
                )
                .with_description("Tenant IDs trusted by the cluster; `*` trusts every tenant"),
            )
            .attribute(
                AttributeSchema::new(
                    "optimized_auto_scale",
                    AttributeType::Block(vec![
                        AttributeSchema::new("minimum_instances", types::int_between(0, 1000))
                            .required()
                            .with_provider_name("minimum"),
                        AttributeSchema::new("maximum_instances", types::int_between(0, 1000))
                            .required()
                            .with_provider_name("maximum"),
                    ]),
                )
                .with_provider_name("properties.optimizedAutoscale"),
            )
            .attribute(
                AttributeSchema::new(
                    "virtual_network_configuration",
                    AttributeType::Block(vec![
                        AttributeSchema::new("subnet_id", types::resource_id())
                            .required()
                            .with_provider_name("subnetId"),
                        AttributeSchema::new("engine_public_ip_id", types::resource_id())
                            .required()
                            .with_provider_name("enginePublicIpId"),
                        AttributeSchema::new("data_management_public_ip_id", types::resource_id())
                            .required()
                            .with_provider_name("dataManagementPublicIpId"),
                    ]),
                )
                .force_new()
                .with_provider_name("properties.virtualNetworkConfiguration"),
            )
            .attribute(AttributeSchema::new(
                "language_extensions",
                string_list(enum_type(LANGUAGE_EXTENSIONS)),
            ))
            .attribute(
                AttributeSchema::new(
                    "identity",
                    AttributeType::Block(vec![
                        AttributeSchema::new(
                            "type",
                            enum_type(&[
                                "SystemAssigned",
                                "UserAssigned",
                                "SystemAssigned, UserAssigned",
                            ]),
                        )
                        .required(),
                        AttributeSchema::new(
                            "identity_ids",
                            string_list(validate::types::user_assigned_identity_id()),
                        ),
                        AttributeSchema::new("principal_id", AttributeType::String).computed(),
                        AttributeSchema::new("tenant_id", AttributeType::String).computed(),
                    ]),
                )
                .with_description("Managed identities assigned to the cluster"),
            )
            .attribute(
                AttributeSchema::new("engine", enum_type(ENGINE_TYPES))
                    .force_new()
                    .with_default(string_default(default_engine(config.four_point_oh_beta)))
                    .with_provider_name("properties.engineType"),
            )
            .attribute(
                AttributeSchema::new("uri", AttributeType::String)
                    .computed()
                    .with_provider_name("properties.uri"),
            )
            .attribute(
                AttributeSchema::new("data_ingestion_uri", AttributeType::String)
                    .computed()
                    .with_provider_name("properties.dataIngestionUri"),
            )
            .attribute(
                AttributeSchema::new("public_network_access_enabled", AttributeType::Bool)
                    .with_default(Value::Bool(true)),
            )
            .attribute(
                AttributeSchema::new("double_encryption_enabled", AttributeType::Bool)
                    .force_new()
                    .with_provider_name("properties.enableDoubleEncryption"),
            )
            .attribute(
                AttributeSchema::new("auto_stop_enabled", AttributeType::Bool)
                    .with_default(Value::Bool(true))
                    .with_provider_name("properties.enableAutoStop"),
            )
            .attribute(
                AttributeSchema::new("disk_encryption_enabled", AttributeType::Bool)
                    .with_default(Value::Bool(false))
                    .with_provider_name("properties.enableDiskEncryption"),
            )
            .attribute(
                AttributeSchema::new("streaming_ingestion_enabled", AttributeType::Bool)
                    .with_default(Value::Bool(false))
                    .with_provider_name("properties.enableStreamingIngest"),
            )
            .attribute(
                AttributeSchema::new("purge_enabled", AttributeType::Bool)
                    .with_default(Value::Bool(false))
                    .with_provider_name("properties.enablePurge"),
            )
            .attribute(
                AttributeSchema::new("zones", string_list(AttributeType::String))
                    .force_new()
                    .with_provider_name("zones"),
            )
            .attribute(tags_attribute()),
    }
}

/// Returns the schema config for azurerm_kusto_attached_database_configuration
pub fn attached_database_configuration_config() -> AzureSchemaConfig {
    let table_list = || string_list(AttributeType::String);
    AzureSchemaConfig {
        resource_type_name: "azurerm_kusto_attached_database_configuration",
        id_schema: AttachedDatabaseConfigurationId::schema(),
        id_source: IdSource::Attributes(&["resource_group_name", "cluster_name", "name"]),
        timeouts: KUSTO_TIMEOUTS,
        lock_field: None,
        schema: ResourceSchema::new("azurerm_kusto_attached_database_configuration")
            .with_description("Follows databases of another Kusto cluster")
            .attribute(name_attribute(validate::types::kusto_data_connection_name()))
            .attribute(resource_group_name_attribute())
            .attribute(location_attribute())
            .attribute(cluster_name_attribute())
            .attribute(
                AttributeSchema::new(
                    "database_name",
                    validate::types::kusto_database_name_or_wildcard(),
                )
                .required()
                .force_new()
                .with_description("Database to follow, or `*` for all of them")
                .with_provider_name("properties.databaseName"),
            )
            .attribute(
                AttributeSchema::new("cluster_resource_id", types::resource_id())
                    .required()
                    .force_new()
                    .with_provider_name("properties.clusterResourceId"),
            )
            .attribute(
                AttributeSchema::new("attached_database_names", table_list())
                    .computed()
                    .with_provider_name("properties.attachedDatabaseNames"),
            )
            .attribute(
                AttributeSchema::new(
                    "default_principal_modification_kind",
                    enum_type(&["None", "Replace", "Union"]),
                )
                .with_default(string_default("None"))
                .with_provider_name("properties.defaultPrincipalsModificationKind"),
            )
            .attribute(
                AttributeSchema::new(
                    "sharing",
                    AttributeType::Block(vec![
                        AttributeSchema::new("external_tables_to_exclude", table_list())
                            .with_provider_name("externalTablesToExclude"),
                        AttributeSchema::new("external_tables_to_include", table_list())
                            .with_provider_name("externalTablesToInclude"),
                        AttributeSchema::new("materialized_views_to_exclude", table_list())
                            .with_provider_name("materializedViewsToExclude"),
                        AttributeSchema::new("materialized_views_to_include", table_list())
                            .with_provider_name("materializedViewsToInclude"),
                        AttributeSchema::new("tables_to_exclude", table_list())
                            .with_provider_name("tablesToExclude"),
                        AttributeSchema::new("tables_to_include", table_list())
                            .with_provider_name("tablesToInclude"),
                    ]),
                )
                .with_provider_name("properties.tableLevelSharingProperties"),
            ),
    }
}

/// Returns the schema config for azurerm_kusto_cluster_principal_assignment
pub fn cluster_principal_assignment_config() -> AzureSchemaConfig {
    AzureSchemaConfig {
        resource_type_name: "azurerm_kusto_cluster_principal_assignment",
        id_schema: ClusterPrincipalAssignmentId::schema(),
        id_source: IdSource::Attributes(&["resource_group_name", "cluster_name", "name"]),
        timeouts: KUSTO_TIMEOUTS,
        lock_field: None,
        schema: ResourceSchema::new("azurerm_kusto_cluster_principal_assignment")
            .with_description("Assigns a role on a Kusto cluster to a principal")
            .attribute(name_attribute(
                validate::types::kusto_principal_assignment_name(),
            ))
            .attribute(resource_group_name_attribute())
            .attribute(cluster_name_attribute())
            .attribute(
                AttributeSchema::new("tenant_id", types::non_empty_string())
                    .required()
                    .force_new()
                    .with_provider_name("properties.tenantId"),
            )
            .attribute(
                AttributeSchema::new("tenant_name", AttributeType::String)
                    .computed()
                    .with_provider_name("properties.tenantName"),
            )
            .attribute(
                AttributeSchema::new("principal_id", types::non_empty_string())
                    .required()
                    .force_new()
                    .with_provider_name("properties.principalId"),
            )
            .attribute(
                AttributeSchema::new("principal_name", AttributeType::String)
                    .computed()
                    .with_provider_name("properties.principalName"),
            )
            .attribute(
                AttributeSchema::new("principal_type", enum_type(&["App", "Group", "User"]))
                    .required()
                    .force_new()
                    .with_provider_name("properties.principalType"),
            )
            .attribute(
                AttributeSchema::new(
                    "role",
                    enum_type(&["AllDatabasesAdmin", "AllDatabasesViewer"]),
                )
                .required()
                .force_new()
                .with_provider_name("properties.role"),
            ),
    }
}
