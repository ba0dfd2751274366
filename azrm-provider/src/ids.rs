//! Typed resource IDs for every resource type of the provider

use azrm_core::define_resource_id;
use azrm_core::resource_id::Segment;

define_resource_id! {
    /// A Video Analyzer account
    pub struct VideoAnalyzerId("Video Analyzer") {
        segments: [
            Segment::literal("subscriptions"),
            Segment::value("subscriptionId"),
            Segment::literal("resourceGroups"),
            Segment::value("resourceGroupName"),
            Segment::literal("providers"),
            Segment::literal("Microsoft.Media"),
            Segment::literal("videoAnalyzers"),
            Segment::value("videoAnalyzerName"),
        ],
        fields: [subscription_id, resource_group_name, video_analyzer_name],
    }
}

define_resource_id! {
    /// A Container Apps managed environment
    pub struct ManagedEnvironmentId("Managed Environment") {
        segments: [
            Segment::literal("subscriptions"),
            Segment::value("subscriptionId"),
            Segment::literal("resourceGroups"),
            Segment::value("resourceGroupName"),
            Segment::literal("providers"),
            Segment::literal("Microsoft.App"),
            Segment::literal("managedEnvironments"),
            Segment::value("environmentName"),
        ],
        fields: [subscription_id, resource_group_name, environment_name],
    }
}

define_resource_id! {
    /// A certificate uploaded to a managed environment
    pub struct CertificateId("Certificate") {
        segments: [
            Segment::literal("subscriptions"),
            Segment::value("subscriptionId"),
            Segment::literal("resourceGroups"),
            Segment::value("resourceGroupName"),
            Segment::literal("providers"),
            Segment::literal("Microsoft.App"),
            Segment::literal("managedEnvironments"),
            Segment::value("environmentName"),
            Segment::literal("certificates"),
            Segment::value("certificateName"),
        ],
        fields: [subscription_id, resource_group_name, environment_name, certificate_name],
    }
}

define_resource_id! {
    /// A Kusto (Azure Data Explorer) cluster
    pub struct ClusterId("Kusto Cluster") {
        segments: [
            Segment::literal("subscriptions"),
            Segment::value("subscriptionId"),
            Segment::literal("resourceGroups"),
            Segment::value("resourceGroupName"),
            Segment::literal("providers"),
            Segment::literal("Microsoft.Kusto"),
            Segment::literal("clusters"),
            Segment::value("clusterName"),
        ],
        fields: [subscription_id, resource_group_name, cluster_name],
    }
}

define_resource_id! {
    /// A database attached to a Kusto cluster as a follower
    pub struct AttachedDatabaseConfigurationId("Attached Database Configuration") {
        segments: [
            Segment::literal("subscriptions"),
            Segment::value("subscriptionId"),
            Segment::literal("resourceGroups"),
            Segment::value("resourceGroupName"),
            Segment::literal("providers"),
            Segment::literal("Microsoft.Kusto"),
            Segment::literal("clusters"),
            Segment::value("clusterName"),
            Segment::literal("attachedDatabaseConfigurations"),
            Segment::value("attachedDatabaseConfigurationName"),
        ],
        fields: [
            subscription_id,
            resource_group_name,
            cluster_name,
            attached_database_configuration_name,
        ],
    }
}

define_resource_id! {
    /// A principal assigned a role on a Kusto cluster
    pub struct ClusterPrincipalAssignmentId("Cluster Principal Assignment") {
        segments: [
            Segment::literal("subscriptions"),
            Segment::value("subscriptionId"),
            Segment::literal("resourceGroups"),
            Segment::value("resourceGroupName"),
            Segment::literal("providers"),
            Segment::literal("Microsoft.Kusto"),
            Segment::literal("clusters"),
            Segment::value("clusterName"),
            Segment::literal("principalAssignments"),
            Segment::value("principalAssignmentName"),
        ],
        fields: [
            subscription_id,
            resource_group_name,
            cluster_name,
            principal_assignment_name,
        ],
    }
}

define_resource_id! {
    /// A Network Manager
    pub struct NetworkManagerId("Network Manager") {
        segments: [
            Segment::literal("subscriptions"),
            Segment::value("subscriptionId"),
            Segment::literal("resourceGroups"),
            Segment::value("resourceGroupName"),
            Segment::literal("providers"),
            Segment::literal("Microsoft.Network"),
            Segment::literal("networkManagers"),
            Segment::value("networkManagerName"),
        ],
        fields: [subscription_id, resource_group_name, network_manager_name],
    }
}

define_resource_id! {
    /// A connectivity configuration of a Network Manager
    pub struct NetworkManagerConnectivityConfigurationId("Network Manager Connectivity Configuration") {
        segments: [
            Segment::literal("subscriptions"),
            Segment::value("subscriptionId"),
            Segment::literal("resourceGroups"),
            Segment::value("resourceGroupName"),
            Segment::literal("providers"),
            Segment::literal("Microsoft.Network"),
            Segment::literal("networkManagers"),
            Segment::value("networkManagerName"),
            Segment::literal("connectivityConfigurations"),
            Segment::value("connectivityConfigurationName"),
        ],
        fields: [
            subscription_id,
            resource_group_name,
            network_manager_name,
            connectivity_configuration_name,
        ],
    }
}

define_resource_id! {
    /// A user-assigned managed identity
    pub struct UserAssignedIdentityId("User Assigned Identity") {
        segments: [
            Segment::literal("subscriptions"),
            Segment::value("subscriptionId"),
            Segment::literal("resourceGroups"),
            Segment::value("resourceGroupName"),
            Segment::literal("providers"),
            Segment::literal("Microsoft.ManagedIdentity"),
            Segment::literal("userAssignedIdentities"),
            Segment::value("userAssignedIdentityName"),
        ],
        fields: [subscription_id, resource_group_name, user_assigned_identity_name],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azrm_core::resource_id::ResourceIdError;

    const SUBSCRIPTION: &str = "12345678-1234-9876-4563-123456789012";

    #[test]
    fn connectivity_configuration_format() {
        let id = NetworkManagerConnectivityConfigurationId::new(
            SUBSCRIPTION,
            "resGroup1",
            "networkManager1",
            "conf1",
        );
        assert_eq!(
            id.id().unwrap(),
            "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/resGroup1/providers/Microsoft.Network/networkManagers/networkManager1/connectivityConfigurations/conf1"
        );
    }

    #[test]
    fn connectivity_configuration_parse() {
        let input = "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/resGroup1/providers/Microsoft.Network/networkManagers/networkManager1/connectivityConfigurations/conf1";

        let id = NetworkManagerConnectivityConfigurationId::parse(input).unwrap();
        assert_eq!(id.subscription_id, SUBSCRIPTION);
        assert_eq!(id.resource_group_name, "resGroup1");
        assert_eq!(id.network_manager_name, "networkManager1");
        assert_eq!(id.connectivity_configuration_name, "conf1");

        let upper = input.to_uppercase();
        assert!(NetworkManagerConnectivityConfigurationId::parse(&upper).is_err());
        let id = NetworkManagerConnectivityConfigurationId::parse_insensitively(&upper).unwrap();
        assert_eq!(id.resource_group_name, "RESGROUP1");
        assert_eq!(id.connectivity_configuration_name, "CONF1");

        assert!(
            NetworkManagerConnectivityConfigurationId::parse(&format!("{}/extra", input)).is_err()
        );
    }

    #[test]
    fn connectivity_configuration_rejects_truncated_ids() {
        let full = "/subscriptions/12345678-1234-9876-4563-123456789012/resourceGroups/resGroup1/providers/Microsoft.Network/networkManagers/networkManager1/connectivityConfigurations/conf1";
        let mut prefix = String::new();
        for segment in full.trim_start_matches('/').split('/') {
            assert!(
                NetworkManagerConnectivityConfigurationId::parse(&prefix).is_err(),
                "{:?} should not parse",
                prefix
            );
            prefix.push('/');
            prefix.push_str(segment);
        }
        assert!(NetworkManagerConnectivityConfigurationId::parse(&prefix).is_ok());
    }

    #[test]
    fn certificate_nests_under_managed_environment() {
        let env = ManagedEnvironmentId::new(SUBSCRIPTION, "rg", "env1");
        let cert = CertificateId::new(
            &env.subscription_id,
            &env.resource_group_name,
            &env.environment_name,
            "cert1",
        );
        let cert_id = cert.id().unwrap();
        assert!(cert_id.starts_with(&env.id().unwrap()));
        assert!(cert_id.ends_with("/certificates/cert1"));
        assert_eq!(CertificateId::parse(&cert_id).unwrap(), cert);
    }

    #[test]
    fn wrong_type_is_a_mismatch() {
        let cluster = ClusterId::new(SUBSCRIPTION, "rg", "kustocluster").id().unwrap();
        let err = VideoAnalyzerId::parse(&cluster).unwrap_err();
        assert_eq!(
            err,
            ResourceIdError::SegmentMismatch {
                expected: "Microsoft.Media",
                position: 6,
                actual: Some("Microsoft.Kusto".to_string()),
            }
        );
    }

    #[test]
    fn principal_assignment_display() {
        let id = ClusterPrincipalAssignmentId::new(SUBSCRIPTION, "rg", "kustocluster", "admin");
        let shown = id.to_string();
        assert!(shown.starts_with("Cluster Principal Assignment ("));
        assert!(shown.contains("Principal Assignment Name: \"admin\""));
    }

    #[test]
    fn typed_ids_serialize_as_strings() {
        let id = UserAssignedIdentityId::new(SUBSCRIPTION, "rg", "identity1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.id().unwrap()));
        let back: UserAssignedIdentityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
