//! Container Apps schema definitions

use azrm_core::provider::Timeouts;
use azrm_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{AzureSchemaConfig, IdSource, name_attribute, tags_attribute};
use crate::ids::{CertificateId, ManagedEnvironmentId};
use crate::validate;

fn computed_string(name: &str, path: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::String)
        .computed()
        .with_provider_name(path)
}

/// Returns the schema config for azurerm_container_app_environment_certificate
pub fn environment_certificate_config() -> AzureSchemaConfig {
    AzureSchemaConfig {
        resource_type_name: "azurerm_container_app_environment_certificate",
        id_schema: CertificateId::schema(),
        id_source: IdSource::Parent {
            attribute: "container_app_environment_id",
            schema: ManagedEnvironmentId::schema(),
        },
        timeouts: Timeouts::mutating(30, 5),
        lock_field: None,
        schema: ResourceSchema::new("azurerm_container_app_environment_certificate")
            .with_description("Manages a certificate of a Container App Environment")
            .attribute(name_attribute(validate::types::certificate_name()))
            .attribute(
                AttributeSchema::new(
                    "container_app_environment_id",
                    validate::types::managed_environment_id(),
                )
                .required()
                .force_new()
                .with_description("The Container App Managed Environment ID to configure this Certificate on"),
            )
            .attribute(
                AttributeSchema::new("certificate_blob", types::base64())
                    .required()
                    .force_new()
                    .sensitive()
                    .with_description("The Certificate Private Key as a base64 encoded PFX or PEM")
                    .with_provider_name("properties.value"),
            )
            .attribute(
                AttributeSchema::new("certificate_password", AttributeType::String)
                    .required()
                    .force_new()
                    .sensitive()
                    .with_provider_name("properties.password"),
            )
            .attribute(computed_string("subject_name", "properties.subjectName"))
            .attribute(computed_string("issuer", "properties.issuer"))
            .attribute(computed_string("issue_date", "properties.issueDate"))
            .attribute(computed_string("expiration_date", "properties.expirationDate"))
            .attribute(computed_string("thumbprint", "properties.thumbprint"))
            .attribute(tags_attribute()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azrm_core::resource::Value;
    use std::collections::HashMap;

    #[test]
    fn certificate_blob_must_be_base64() {
        let schema = environment_certificate_config().schema;
        let mut attrs = HashMap::from([
            ("name".to_string(), Value::string("cert1")),
            (
                "container_app_environment_id".to_string(),
                Value::string("/subscriptions/sub/resourceGroups/rg/providers/Microsoft.App/managedEnvironments/env1"),
            ),
            ("certificate_blob".to_string(), Value::string("aGVsbG8=")),
            ("certificate_password".to_string(), Value::string("")),
        ]);
        assert!(schema.validate(&attrs).is_ok());

        attrs.insert("certificate_blob".to_string(), Value::string("not base64!"));
        assert!(schema.validate(&attrs).is_err());
    }

    #[test]
    fn environment_id_must_be_a_managed_environment() {
        let schema = environment_certificate_config().schema;
        let attr = &schema.attributes["container_app_environment_id"];
        let wrong = Value::string(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Web/sites/app1",
        );
        assert!(attr.attr_type.validate(&wrong).is_err());
    }

    #[test]
    fn secrets_are_sensitive() {
        let schema = environment_certificate_config().schema;
        assert!(schema.attributes["certificate_blob"].sensitive);
        assert!(schema.attributes["certificate_password"].sensitive);
        assert!(!schema.attributes["thumbprint"].sensitive);
    }
}
