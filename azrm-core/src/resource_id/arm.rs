//! Schema-less parsing of arbitrary ARM resource IDs
//!
//! Used where any resource ID is acceptable (e.g., a subnet or storage
//! account referenced by another resource), so the exact shape is unknown.

use thiserror::Error;

/// Errors from [`ArmResourceId::parse`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArmIdError {
    #[error("resource ID is empty")]
    Empty,

    #[error("resource ID {0:?} must start with `/`")]
    MissingLeadingSlash(String),

    #[error("resource ID {0:?} must contain key/value pairs, found an odd number of segments")]
    OddSegments(String),

    #[error("resource ID {id:?} has an empty segment at position {position}")]
    EmptySegment { id: String, position: usize },

    #[error("resource ID {0:?} does not start with `/subscriptions/{{subscriptionId}}`")]
    NoSubscription(String),
}

/// Components of a parsed ARM resource ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmResourceId {
    pub subscription_id: String,
    pub resource_group: Option<String>,
    /// Provider namespace (e.g., "Microsoft.Kusto")
    pub provider: Option<String>,
    /// Remaining (type, name) pairs after the provider namespace, in order
    pub path: Vec<(String, String)>,
}

impl ArmResourceId {
    pub fn parse(input: &str) -> Result<Self, ArmIdError> {
        if input.is_empty() {
            return Err(ArmIdError::Empty);
        }
        let rest = input
            .strip_prefix('/')
            .ok_or_else(|| ArmIdError::MissingLeadingSlash(input.to_string()))?;

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() % 2 != 0 {
            return Err(ArmIdError::OddSegments(input.to_string()));
        }
        if let Some(index) = parts.iter().position(|p| p.is_empty()) {
            return Err(ArmIdError::EmptySegment {
                id: input.to_string(),
                position: index + 1,
            });
        }

        let mut pairs = parts.chunks(2).map(|pair| (pair[0], pair[1]));
        let subscription_id = match pairs.next() {
            Some((key, value)) if key.eq_ignore_ascii_case("subscriptions") => value.to_string(),
            _ => return Err(ArmIdError::NoSubscription(input.to_string())),
        };

        let mut resource_group = None;
        let mut provider = None;
        let mut path = Vec::new();
        for (key, value) in pairs {
            if provider.is_none() && path.is_empty() && key.eq_ignore_ascii_case("resourceGroups") {
                resource_group = Some(value.to_string());
            } else if provider.is_none() && key.eq_ignore_ascii_case("providers") {
                provider = Some(value.to_string());
            } else {
                path.push((key.to_string(), value.to_string()));
            }
        }

        Ok(Self {
            subscription_id,
            resource_group,
            provider,
            path,
        })
    }

    /// Name of the innermost resource, if the ID points below a provider
    pub fn name(&self) -> Option<&str> {
        self.path.last().map(|(_, name)| name.as_str())
    }

    /// Full resource type, e.g. "Microsoft.Kusto/clusters/databases"
    pub fn resource_type(&self) -> Option<String> {
        let provider = self.provider.as_ref()?;
        let mut out = provider.clone();
        for (key, _) in &self.path {
            out.push('/');
            out.push_str(key);
        }
        Some(out)
    }
}

/// Check that `input` is a well-formed ARM resource ID
pub fn validate(input: &str) -> Result<(), ArmIdError> {
    ArmResourceId::parse(input).map(|_| ())
}
