//! Attribute validators for names and IDs used by the Azure resource types

use std::sync::LazyLock;

use azrm_core::resource::Value;
use azrm_core::schema::{AttributeType, string_value, validate_uuid};
use regex::Regex;

use crate::ids::{ManagedEnvironmentId, NetworkManagerId, UserAssignedIdentityId};

static RESOURCE_GROUP_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-\w._()]+$").expect("valid regex"));
static KUSTO_CLUSTER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]+$").expect("valid regex"));
static KUSTO_DATABASE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-.\s]+$").expect("valid regex"));
static KUSTO_ENTITY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s.-]+$").expect("valid regex"));
static VIDEO_ANALYZER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-z0-9]{3,24}$").expect("valid regex"));
static CERTIFICATE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9._-]*[a-zA-Z0-9])?$").expect("valid regex"));
static NETWORK_MANAGER_CHILD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]([\w.-]*\w)?$").expect("valid regex"));

fn check_length(kind: &str, s: &str, min: usize, max: usize) -> Result<(), String> {
    let len = s.chars().count();
    if len < min || len > max {
        return Err(format!(
            "{} must be between {} and {} characters: {:?}",
            kind, min, max, s
        ));
    }
    Ok(())
}

fn check_pattern(kind: &str, s: &str, pattern: &Regex, rule: &str) -> Result<(), String> {
    if pattern.is_match(s) {
        Ok(())
    } else {
        Err(format!("{} {}: {:?}", kind, rule, s))
    }
}

pub fn validate_resource_group_name(s: &str) -> Result<(), String> {
    check_length("resource group name", s, 1, 90)?;
    check_pattern(
        "resource group name",
        s,
        &RESOURCE_GROUP_NAME,
        "may only contain alphanumerics, underscores, parentheses, hyphens and periods",
    )?;
    if s.ends_with('.') {
        return Err(format!("resource group name cannot end in a period: {:?}", s));
    }
    Ok(())
}

pub fn validate_kusto_cluster_name(s: &str) -> Result<(), String> {
    check_pattern(
        "cluster name",
        s,
        &KUSTO_CLUSTER_NAME,
        "must begin with a lowercase letter and contain only lowercase letters and numbers",
    )?;
    check_length("cluster name", s, 4, 22)
}

pub fn validate_kusto_database_name(s: &str) -> Result<(), String> {
    check_pattern(
        "database name",
        s,
        &KUSTO_DATABASE_NAME,
        "may only contain alphanumerics, underscores, hyphens, periods and spaces",
    )?;
    check_length("database name", s, 1, 260)
}

/// Attached database configuration and data connection names
pub fn validate_kusto_data_connection_name(s: &str) -> Result<(), String> {
    check_pattern(
        "data connection name",
        s,
        &KUSTO_ENTITY_NAME,
        "may only contain alphanumerics, hyphens, periods and spaces",
    )?;
    check_length("data connection name", s, 1, 40)
}

pub fn validate_kusto_principal_assignment_name(s: &str) -> Result<(), String> {
    check_pattern(
        "principal assignment name",
        s,
        &KUSTO_ENTITY_NAME,
        "may only contain alphanumerics, hyphens, periods and spaces",
    )?;
    check_length("principal assignment name", s, 1, 260)
}

pub fn validate_video_analyzer_name(s: &str) -> Result<(), String> {
    check_pattern(
        "Video Analyzer name",
        s,
        &VIDEO_ANALYZER_NAME,
        "must be 3 - 24 characters long, contain only lowercase letters and numbers",
    )
}

pub fn validate_certificate_name(s: &str) -> Result<(), String> {
    check_pattern(
        "certificate name",
        s,
        &CERTIFICATE_NAME,
        "must start and end with an alphanumeric and contain only alphanumerics, periods, underscores and hyphens",
    )?;
    check_length("certificate name", s, 1, 260)
}

pub fn validate_network_manager_child_name(s: &str) -> Result<(), String> {
    check_pattern(
        "name",
        s,
        &NETWORK_MANAGER_CHILD_NAME,
        "must start with an alphanumeric, end with an alphanumeric or underscore and contain only word characters, periods and hyphens",
    )?;
    check_length("name", s, 1, 64)
}

/// A trusted tenant is a UUID, an empty string or `*`
pub fn validate_trusted_tenant(s: &str) -> Result<(), String> {
    if s.is_empty() || s == "*" {
        return Ok(());
    }
    validate_uuid(s).map_err(|_| format!("expected a tenant ID, \"\" or \"*\": {:?}", s))
}

/// Database name or `*` for every database of the leader cluster
pub fn validate_database_name_or_wildcard(s: &str) -> Result<(), String> {
    if s == "*" {
        return Ok(());
    }
    validate_kusto_database_name(s)
}

fn custom(name: &str, validate: fn(&Value) -> Result<(), String>) -> AttributeType {
    AttributeType::Custom {
        name: name.to_string(),
        base: Box::new(AttributeType::String),
        validate,
    }
}

/// Attribute types built from the validators above
pub mod types {
    use super::*;

    pub fn resource_group_name() -> AttributeType {
        custom("ResourceGroupName", |v| {
            validate_resource_group_name(string_value(v)?)
        })
    }

    pub fn kusto_cluster_name() -> AttributeType {
        custom("KustoClusterName", |v| {
            validate_kusto_cluster_name(string_value(v)?)
        })
    }

    pub fn kusto_database_name_or_wildcard() -> AttributeType {
        custom("KustoDatabaseName", |v| {
            validate_database_name_or_wildcard(string_value(v)?)
        })
    }

    pub fn kusto_data_connection_name() -> AttributeType {
        custom("KustoDataConnectionName", |v| {
            validate_kusto_data_connection_name(string_value(v)?)
        })
    }

    pub fn kusto_principal_assignment_name() -> AttributeType {
        custom("KustoPrincipalAssignmentName", |v| {
            validate_kusto_principal_assignment_name(string_value(v)?)
        })
    }

    pub fn video_analyzer_name() -> AttributeType {
        custom("VideoAnalyzerName", |v| {
            validate_video_analyzer_name(string_value(v)?)
        })
    }

    pub fn certificate_name() -> AttributeType {
        custom("CertificateName", |v| validate_certificate_name(string_value(v)?))
    }

    pub fn network_manager_child_name() -> AttributeType {
        custom("NetworkManagerChildName", |v| {
            validate_network_manager_child_name(string_value(v)?)
        })
    }

    pub fn trusted_tenant() -> AttributeType {
        custom("TrustedTenant", |v| validate_trusted_tenant(string_value(v)?))
    }

    pub fn managed_environment_id() -> AttributeType {
        custom("ManagedEnvironmentId", |v| {
            ManagedEnvironmentId::validate(string_value(v)?).map_err(|e| e.to_string())
        })
    }

    pub fn network_manager_id() -> AttributeType {
        custom("NetworkManagerId", |v| {
            NetworkManagerId::validate(string_value(v)?).map_err(|e| e.to_string())
        })
    }

    pub fn user_assigned_identity_id() -> AttributeType {
        custom("UserAssignedIdentityId", |v| {
            UserAssignedIdentityId::validate(string_value(v)?).map_err(|e| e.to_string())
        })
    }
}
