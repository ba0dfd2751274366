//! Provider configuration

use serde::{Deserialize, Serialize};

pub const SUBSCRIPTION_ID_ENV: &str = "ARM_SUBSCRIPTION_ID";
pub const FOUR_POINT_OH_BETA_ENV: &str = "ARM_FOURPOINTZERO_BETA";

/// Settings shared by every resource type of the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Subscription new resources are created in
    pub subscription_id: String,
    /// Opt in to the defaults of the next major version
    #[serde(default)]
    pub four_point_oh_beta: bool,
}

impl ProviderConfig {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            four_point_oh_beta: false,
        }
    }

    pub fn with_four_point_oh_beta(mut self, enabled: bool) -> Self {
        self.four_point_oh_beta = enabled;
        self
    }

    /// Read `ARM_SUBSCRIPTION_ID` and `ARM_FOURPOINTZERO_BETA`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let subscription_id = lookup(SUBSCRIPTION_ID_ENV).unwrap_or_default();
        let four_point_oh_beta = lookup(FOUR_POINT_OH_BETA_ENV)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false);
        Self {
            subscription_id,
            four_point_oh_beta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_subscription_and_beta_flag() {
        let config = ProviderConfig::from_lookup(lookup(&[
            (SUBSCRIPTION_ID_ENV, "12345678-1234-9876-4563-123456789012"),
            (FOUR_POINT_OH_BETA_ENV, "TRUE"),
        ]));
        assert_eq!(
            config.subscription_id,
            "12345678-1234-9876-4563-123456789012"
        );
        assert!(config.four_point_oh_beta);
    }

    #[test]
    fn beta_flag_defaults_to_off() {
        let config = ProviderConfig::from_lookup(lookup(&[(FOUR_POINT_OH_BETA_ENV, "no")]));
        assert_eq!(config.subscription_id, "");
        assert!(!config.four_point_oh_beta);
    }

    #[test]
    fn deserializes_without_beta_flag() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"subscription_id": "sub"}"#).unwrap();
        assert_eq!(config, ProviderConfig::new("sub"));
    }
}
