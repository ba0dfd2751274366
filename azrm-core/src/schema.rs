//! Schema - Define type schemas for resources
//!
//! Providers define schemas for each resource type,
//! enabling validation of configuration before any API call is made.

use std::collections::HashMap;
use std::fmt;

use base64::Engine;

use crate::resource::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Integer within an inclusive range
    IntRange { min: i64, max: i64 },
    /// Boolean
    Bool,
    /// Enum (list of allowed values, case-sensitive)
    Enum(Vec<String>),
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List
    List(Box<AttributeType>),
    /// Map
    Map(Box<AttributeType>),
    /// Nested block with its own attributes
    Block(Vec<AttributeSchema>),
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::IntRange { min, max }, Value::Int(n)) => {
                if (*min..=*max).contains(n) {
                    Ok(())
                } else {
                    Err(TypeError::OutOfRange {
                        value: *n,
                        min: *min,
                        max: *max,
                    })
                }
            }

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Block(fields), Value::Map(map)) => {
                for field in fields {
                    match map.get(&field.name) {
                        Some(v) => field.attr_type.validate(v).map_err(|e| {
                            TypeError::BlockFieldError {
                                field: field.name.clone(),
                                inner: Box::new(e),
                            }
                        })?,
                        None if field.required && field.default.is_none() => {
                            return Err(TypeError::MissingRequired {
                                name: field.name.clone(),
                            });
                        }
                        None => {}
                    }
                }
                if let Some(unknown) = map.keys().find(|k| !fields.iter().any(|f| &f.name == *k)) {
                    return Err(TypeError::UnknownAttribute {
                        name: unknown.clone(),
                    });
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name().to_string(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::IntRange { min, max } => format!("Int({}..={})", min, max),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Block(_) => "Block".to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", .expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Value {value} is out of range, expected {min} to {max}")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ComputedOnly { name: String },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },

    #[error("Block field '{field}': {inner}")]
    BlockFieldError { field: String, inner: Box<TypeError> },

    #[error("Attribute '{name}': {inner}")]
    AttributeError { name: String, inner: Box<TypeError> },
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Output set by the API; may not appear in configuration
    pub computed: bool,
    /// Changing the value requires replacing the resource
    pub force_new: bool,
    /// Never echoed back by the API (e.g., passwords)
    pub sensitive: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    /// Dotted path of the property in the API payload (e.g., "properties.enableAutoStop")
    pub provider_name: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            description: None,
            provider_name: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    /// Computed attributes are outputs and cannot be configured
    pub fn is_read_only(&self) -> bool {
        self.computed
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Attributes sorted by name
    pub fn sorted_attributes(&self) -> Vec<&AttributeSchema> {
        let mut attrs: Vec<_> = self.attributes.values().collect();
        attrs.sort_by(|a, b| a.name.cmp(&b.name));
        attrs
    }

    /// Validate resource attributes
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        for schema in self.sorted_attributes() {
            if schema.required && !attributes.contains_key(&schema.name) && schema.default.is_none()
            {
                errors.push(TypeError::MissingRequired {
                    name: schema.name.clone(),
                });
            }
        }

        let mut names: Vec<_> = attributes.keys().collect();
        names.sort();
        for name in names {
            let value = &attributes[name];
            match self.attributes.get(name) {
                Some(schema) if schema.is_read_only() => {
                    errors.push(TypeError::ComputedOnly { name: name.clone() });
                }
                Some(schema) => {
                    if let Err(e) = schema.attr_type.validate(value) {
                        errors.push(TypeError::AttributeError {
                            name: name.clone(),
                            inner: Box::new(e),
                        });
                    }
                }
                None => errors.push(TypeError::UnknownAttribute { name: name.clone() }),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fill in defaults for attributes absent from the configuration
    pub fn apply_defaults(&self, attributes: &mut HashMap<String, Value>) {
        for (name, schema) in &self.attributes {
            if let Some(default) = &schema.default
                && !attributes.contains_key(name)
            {
                attributes.insert(name.clone(), default.clone());
            }
        }
    }

    /// Names of force-new attributes whose value differs between two attribute sets
    pub fn force_new_changes(
        &self,
        current: &HashMap<String, Value>,
        desired: &HashMap<String, Value>,
    ) -> Vec<String> {
        let mut changed: Vec<String> = self
            .attributes
            .values()
            .filter(|s| s.force_new && !s.sensitive)
            .filter(|s| match desired.get(&s.name) {
                Some(wanted) => current.get(&s.name) != Some(wanted),
                None => false,
            })
            .map(|s| s.name.clone())
            .collect();
        changed.sort();
        changed
    }
}

/// Extract a string for use inside a custom validator
pub fn string_value(value: &Value) -> Result<&str, String> {
    value.as_str().ok_or_else(|| "Expected string".to_string())
}

/// Helper functions for common types
pub mod types {
    use super::*;
    use crate::resource_id::arm;

    /// Positive integer type
    pub fn positive_int() -> AttributeType {
        AttributeType::Custom {
            name: "PositiveInt".to_string(),
            base: Box::new(AttributeType::Int),
            validate: |value| {
                if let Value::Int(n) = value {
                    if *n > 0 {
                        Ok(())
                    } else {
                        Err("Value must be positive".to_string())
                    }
                } else {
                    Err("Expected integer".to_string())
                }
            },
        }
    }

    pub fn int_between(min: i64, max: i64) -> AttributeType {
        AttributeType::IntRange { min, max }
    }

    /// String that must not be empty
    pub fn non_empty_string() -> AttributeType {
        AttributeType::Custom {
            name: "NonEmptyString".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| {
                if string_value(value)?.is_empty() {
                    Err("Value must not be empty".to_string())
                } else {
                    Ok(())
                }
            },
        }
    }

    /// UUID string (e.g., a tenant or principal ID)
    pub fn uuid() -> AttributeType {
        AttributeType::Custom {
            name: "Uuid".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| validate_uuid(string_value(value)?),
        }
    }

    /// Base64-encoded string (e.g., a certificate blob)
    pub fn base64() -> AttributeType {
        AttributeType::Custom {
            name: "Base64".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| validate_base64(string_value(value)?),
        }
    }

    /// Any well-formed ARM resource ID
    pub fn resource_id() -> AttributeType {
        AttributeType::Custom {
            name: "ResourceId".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| arm::validate(string_value(value)?).map_err(|e| e.to_string()),
        }
    }

    /// Azure location (e.g., "westeurope")
    pub fn location() -> AttributeType {
        non_empty_string()
    }

    /// Resource tags
    pub fn tags() -> AttributeType {
        AttributeType::Map(Box::new(AttributeType::String))
    }
}

/// Validate a UUID string
pub fn validate_uuid(s: &str) -> Result<(), String> {
    uuid::Uuid::parse_str(s)
        .map(|_| ())
        .map_err(|e| format!("Invalid UUID '{}': {}", s, e))
}

/// Validate that a string is valid standard base64
pub fn validate_base64(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("Expected a non-empty base64 string".to_string());
    }
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map(|_| ())
        .map_err(|e| format!("Invalid base64: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_string_type() {
        let t = AttributeType::String;
        assert!(t.validate(&Value::String("hello".to_string())).is_ok());
        assert!(t.validate(&Value::Int(42)).is_err());
    }

    #[test]
    fn validate_enum_type_is_case_sensitive() {
        let t = AttributeType::Enum(vec!["App".to_string(), "User".to_string()]);
        assert!(t.validate(&Value::string("App")).is_ok());
        assert!(t.validate(&Value::string("app")).is_err());
    }

    #[test]
    fn validate_int_range() {
        let t = types::int_between(1, 1000);
        assert!(t.validate(&Value::Int(1)).is_ok());
        assert!(t.validate(&Value::Int(1000)).is_ok());
        assert!(matches!(
            t.validate(&Value::Int(0)),
            Err(TypeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn validate_positive_int() {
        let t = types::positive_int();
        assert!(t.validate(&Value::Int(1)).is_ok());
        assert!(t.validate(&Value::Int(0)).is_err());
        assert!(t.validate(&Value::string("1")).is_err());
    }

    #[test]
    fn validate_uuid_and_base64() {
        assert!(
            types::uuid()
                .validate(&Value::string("12345678-1234-9876-4563-123456789012"))
                .is_ok()
        );
        assert!(types::uuid().validate(&Value::string("nope")).is_err());
        assert!(types::base64().validate(&Value::string("aGVsbG8=")).is_ok());
        assert!(types::base64().validate(&Value::string("not base64!")).is_err());
        assert!(types::base64().validate(&Value::string("")).is_err());
    }

    #[test]
    fn validate_any_resource_id() {
        let t = types::resource_id();
        assert!(
            t.validate(&Value::string(
                "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/acct"
            ))
            .is_ok()
        );
        assert!(t.validate(&Value::string("acct")).is_err());
    }

    fn sku_block() -> AttributeType {
        AttributeType::Block(vec![
            AttributeSchema::new("name", AttributeType::String).required(),
            AttributeSchema::new("capacity", types::int_between(1, 1000)),
        ])
    }

    #[test]
    fn validate_block() {
        let t = sku_block();
        let ok = Value::Map(HashMap::from([
            ("name".to_string(), Value::string("Standard_D13_v2")),
            ("capacity".to_string(), Value::Int(2)),
        ]));
        assert!(t.validate(&ok).is_ok());

        let missing = Value::Map(HashMap::from([("capacity".to_string(), Value::Int(2))]));
        assert!(matches!(
            t.validate(&missing),
            Err(TypeError::MissingRequired { .. })
        ));

        let bad = Value::Map(HashMap::from([
            ("name".to_string(), Value::string("x")),
            ("capacity".to_string(), Value::Int(0)),
        ]));
        assert!(matches!(
            t.validate(&bad),
            Err(TypeError::BlockFieldError { .. })
        ));

        let unknown = Value::Map(HashMap::from([
            ("name".to_string(), Value::string("x")),
            ("tier".to_string(), Value::string("Basic")),
        ]));
        assert!(matches!(
            t.validate(&unknown),
            Err(TypeError::UnknownAttribute { .. })
        ));
    }

    fn cluster_schema() -> ResourceSchema {
        ResourceSchema::new("cluster")
            .attribute(AttributeSchema::new("name", AttributeType::String).required().force_new())
            .attribute(AttributeSchema::new("sku", sku_block()).required())
            .attribute(
                AttributeSchema::new("auto_stop_enabled", AttributeType::Bool)
                    .with_default(Value::Bool(true)),
            )
            .attribute(
                AttributeSchema::new("uri", AttributeType::String)
                    .computed()
                    .with_description("The FQDN of the cluster."),
            )
    }

    #[test]
    fn validate_resource_schema() {
        let attrs = HashMap::from([
            ("name".to_string(), Value::string("kusto1")),
            (
                "sku".to_string(),
                Value::Map(HashMap::from([(
                    "name".to_string(),
                    Value::string("Standard_D13_v2"),
                )])),
            ),
        ]);
        assert!(cluster_schema().validate(&attrs).is_ok());
    }

    #[test]
    fn missing_required_attribute() {
        let errors = cluster_schema().validate(&HashMap::new()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, TypeError::MissingRequired { .. }))
        );
    }

    #[test]
    fn computed_and_unknown_attributes_are_rejected() {
        let attrs = HashMap::from([
            ("name".to_string(), Value::string("kusto1")),
            (
                "sku".to_string(),
                Value::Map(HashMap::from([("name".to_string(), Value::string("x"))])),
            ),
            ("uri".to_string(), Value::string("https://example")),
            ("colour".to_string(), Value::string("blue")),
        ]);
        let errors = cluster_schema().validate(&attrs).unwrap_err();
        assert!(matches!(errors[0], TypeError::UnknownAttribute { .. }));
        assert!(matches!(errors[1], TypeError::ComputedOnly { .. }));
    }

    #[test]
    fn apply_defaults_keeps_configured_values() {
        let mut attrs = HashMap::new();
        cluster_schema().apply_defaults(&mut attrs);
        assert_eq!(attrs.get("auto_stop_enabled"), Some(&Value::Bool(true)));

        let mut attrs = HashMap::from([("auto_stop_enabled".to_string(), Value::Bool(false))]);
        cluster_schema().apply_defaults(&mut attrs);
        assert_eq!(attrs.get("auto_stop_enabled"), Some(&Value::Bool(false)));
    }

    #[test]
    fn force_new_changes_only_reports_force_new_attributes() {
        let current = HashMap::from([
            ("name".to_string(), Value::string("a")),
            ("auto_stop_enabled".to_string(), Value::Bool(true)),
        ]);
        let desired = HashMap::from([
            ("name".to_string(), Value::string("b")),
            ("auto_stop_enabled".to_string(), Value::Bool(false)),
        ]);
        assert_eq!(
            cluster_schema().force_new_changes(&current, &desired),
            vec!["name".to_string()]
        );
    }
}
