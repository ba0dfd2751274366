//! Azure resource schema definitions
//!
//! Each resource type pairs its attribute schema with the shape of its ID,
//! the attributes the ID is built from, its timeouts and its lock.

pub mod container_apps;
pub mod kusto;
pub mod network;
pub mod video_analyzer;

use azrm_core::provider::Timeouts;
use azrm_core::resource::Value;
use azrm_core::resource_id::ResourceIdSchema;
use azrm_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use crate::config::ProviderConfig;
use crate::validate;

/// Where the values of a resource's ID come from
#[derive(Debug, Clone, Copy)]
pub enum IdSource {
    /// The subscription, then these attributes in path order
    Attributes(&'static [&'static str]),
    /// The parent ID held in `attribute`, then the `name` attribute
    Parent {
        attribute: &'static str,
        schema: &'static ResourceIdSchema,
    },
}

/// Azure schema configuration
///
/// Combines the ResourceSchema with the metadata the provider needs to
/// address the resource.
#[derive(Debug, Clone)]
pub struct AzureSchemaConfig {
    /// Resource type name (e.g., "azurerm_kusto_cluster")
    pub resource_type_name: &'static str,
    pub id_schema: &'static ResourceIdSchema,
    pub id_source: IdSource,
    pub timeouts: Timeouts,
    /// ID field whose value names the lock taken around mutations
    pub lock_field: Option<&'static str>,
    /// The resource schema with attribute definitions
    pub schema: ResourceSchema,
}

/// Returns all schema configs, with defaults chosen by the provider config
pub fn configs(config: &ProviderConfig) -> Vec<AzureSchemaConfig> {
    vec![
        video_analyzer::video_analyzer_config(),
        container_apps::environment_certificate_config(),
        kusto::cluster_config(config),
        kusto::attached_database_configuration_config(),
        kusto::cluster_principal_assignment_config(),
        network::connectivity_configuration_config(),
    ]
}

/// `name`, required and fixed for the life of the resource
pub(crate) fn name_attribute(attr_type: AttributeType) -> AttributeSchema {
    AttributeSchema::new("name", attr_type)
        .required()
        .force_new()
        .with_description("Name of the resource")
}

pub(crate) fn resource_group_name_attribute() -> AttributeSchema {
    AttributeSchema::new("resource_group_name", validate::types::resource_group_name())
        .required()
        .force_new()
        .with_description("Resource group the resource lives in")
}

pub(crate) fn location_attribute() -> AttributeSchema {
    AttributeSchema::new("location", types::location())
        .required()
        .force_new()
        .with_provider_name("location")
}

pub(crate) fn tags_attribute() -> AttributeSchema {
    AttributeSchema::new("tags", types::tags()).with_provider_name("tags")
}

pub(crate) fn enum_type(values: &[&str]) -> AttributeType {
    AttributeType::Enum(values.iter().map(|v| v.to_string()).collect())
}

pub(crate) fn string_list(inner: AttributeType) -> AttributeType {
    AttributeType::List(Box::new(inner))
}

pub(crate) fn string_default(value: &str) -> Value {
    Value::string(value)
}
