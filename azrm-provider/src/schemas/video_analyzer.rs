//! Video Analyzer schema definition

use azrm_core::provider::Timeouts;
use azrm_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{
    AzureSchemaConfig, IdSource, enum_type, location_attribute, name_attribute,
    resource_group_name_attribute, string_list, tags_attribute,
};
use crate::ids::VideoAnalyzerId;
use crate::validate;

/// Returns the schema config for azurerm_video_analyzer
pub fn video_analyzer_config() -> AzureSchemaConfig {
    AzureSchemaConfig {
        resource_type_name: "azurerm_video_analyzer",
        id_schema: VideoAnalyzerId::schema(),
        id_source: IdSource::Attributes(&["resource_group_name", "name"]),
        timeouts: Timeouts::mutating(30, 5),
        lock_field: None,
        schema: ResourceSchema::new("azurerm_video_analyzer")
            .with_description("Manages a Video Analyzer")
            .attribute(name_attribute(validate::types::video_analyzer_name()))
            .attribute(resource_group_name_attribute())
            .attribute(location_attribute())
            .attribute(
                AttributeSchema::new(
                    "storage_account",
                    AttributeType::List(Box::new(AttributeType::Block(vec![
                        AttributeSchema::new("id", types::resource_id())
                            .required()
                            .with_provider_name("id"),
                        AttributeSchema::new(
                            "identity_id",
                            validate::types::user_assigned_identity_id(),
                        )
                        .required()
                        .with_provider_name("identity.userAssignedIdentity"),
                    ]))),
                )
                .required()
                .with_description("Storage account holding the media, accessed via an identity")
                .with_provider_name("properties.storageAccounts"),
            )
            .attribute(
                AttributeSchema::new(
                    "identity",
                    AttributeType::Block(vec![
                        AttributeSchema::new("type", enum_type(&["UserAssigned"])).required(),
                        AttributeSchema::new(
                            "identity_ids",
                            string_list(validate::types::user_assigned_identity_id()),
                        )
                        .required(),
                    ]),
                )
                .required(),
            )
            .attribute(tags_attribute()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azrm_core::resource::Value;
    use std::collections::HashMap;

    const IDENTITY: &str = "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ManagedIdentity/userAssignedIdentities/id1";

    #[test]
    fn storage_account_requires_identity_id() {
        let schema = video_analyzer_config().schema;
        let storage = |fields: Vec<(&str, &str)>| {
            Value::List(vec![Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), Value::string(v)))
                    .collect(),
            )])
        };
        let mut attrs = HashMap::from([
            ("name".to_string(), Value::string("analyzer1")),
            ("resource_group_name".to_string(), Value::string("rg")),
            ("location".to_string(), Value::string("westeurope")),
            (
                "storage_account".to_string(),
                storage(vec![
                    ("id", "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/sa"),
                    ("identity_id", IDENTITY),
                ]),
            ),
            (
                "identity".to_string(),
                Value::Map(HashMap::from([
                    ("type".to_string(), Value::string("UserAssigned")),
                    (
                        "identity_ids".to_string(),
                        Value::List(vec![Value::string(IDENTITY)]),
                    ),
                ])),
            ),
        ]);
        assert!(schema.validate(&attrs).is_ok());

        attrs.insert(
            "storage_account".to_string(),
            storage(vec![("identity_id", IDENTITY)]),
        );
        assert!(schema.validate(&attrs).is_err());
    }
}
