//! Macro for defining typed resource IDs over the generic codec.

/// Define a typed resource ID with named fields.
///
/// The generated struct has one `pub String` field per value segment, in path
/// order, plus:
/// - `schema()` returning the shared `'static` [`ResourceIdSchema`]
/// - `new(..)` taking each value positionally
/// - `parse()`, `parse_insensitively()` and `validate()`
/// - `id()` formatting the canonical path
/// - `Display`, `FromStr`, `Serialize` and `Deserialize`
///
/// # Example
///
/// ```ignore
/// define_resource_id! {
///     /// A Kusto cluster
///     pub struct ClusterId("Kusto Cluster") {
///         segments: [
///             Segment::literal("subscriptions"),
///             Segment::value("subscriptionId"),
///             Segment::literal("resourceGroups"),
///             Segment::value("resourceGroupName"),
///             Segment::literal("providers"),
///             Segment::literal("Microsoft.Kusto"),
///             Segment::literal("clusters"),
///             Segment::value("clusterName"),
///         ],
///         fields: [subscription_id, resource_group_name, cluster_name],
///     }
/// }
/// ```
///
/// [`ResourceIdSchema`]: crate::resource_id::ResourceIdSchema
#[macro_export]
macro_rules! define_resource_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($label:literal) {
            segments: [$($segment:expr),* $(,)?],
            fields: [$($field:ident),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis struct $name {
            $(pub $field: String,)*
        }

        impl $name {
            /// The ID schema shared by every instance of this type
            pub fn schema() -> &'static $crate::resource_id::ResourceIdSchema {
                static SCHEMA: $crate::resource_id::ResourceIdSchema =
                    $crate::resource_id::ResourceIdSchema::new($label, &[$($segment),*]);
                &SCHEMA
            }

            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: impl Into<String>),*) -> Self {
                Self {
                    $($field: $field.into(),)*
                }
            }

            fn from_values(values: Vec<String>) -> Self {
                let mut values = values.into_iter();
                Self {
                    $($field: values.next().unwrap_or_default(),)*
                }
            }

            /// Convert a generic ID, if it was built with this type's schema
            pub fn from_resource_id(id: $crate::resource_id::ResourceId) -> Option<Self> {
                if ::std::ptr::eq(id.schema(), Self::schema()) {
                    Some(Self::from_values(id.into_values()))
                } else {
                    None
                }
            }

            pub fn to_resource_id(&self) -> $crate::resource_id::ResourceId {
                $crate::resource_id::ResourceId::new(
                    Self::schema(),
                    [$(self.$field.as_str()),*],
                )
            }

            pub fn parse(input: &str) -> Result<Self, $crate::resource_id::ResourceIdError> {
                Self::schema()
                    .parse(input)
                    .map(|id| Self::from_values(id.into_values()))
            }

            pub fn parse_insensitively(
                input: &str,
            ) -> Result<Self, $crate::resource_id::ResourceIdError> {
                Self::schema()
                    .parse_insensitively(input)
                    .map(|id| Self::from_values(id.into_values()))
            }

            pub fn validate(input: &str) -> Result<(), $crate::resource_id::ResourceIdError> {
                Self::schema().validate(input)
            }

            /// The canonical path string
            pub fn id(&self) -> Result<String, $crate::resource_id::ResourceIdError> {
                Self::schema().format(&[$(self.$field.as_str()),*])
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.to_resource_id(), f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::resource_id::ResourceIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                let id = self.id().map_err($crate::__serde::ser::Error::custom)?;
                serializer.serialize_str(&id)
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let s = <String as $crate::__serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&s).map_err($crate::__serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::resource_id::{ResourceId, ResourceIdError, Segment};

    crate::define_resource_id! {
        /// Test-only ID shaped like a Kusto cluster
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

    const CLUSTER: &str =
        "/subscriptions/0000/resourceGroups/example-rg/providers/Microsoft.Kusto/clusters/kustocluster";

    #[test]
    fn typed_id_round_trip() {
        let id = ClusterId::new("0000", "example-rg", "kustocluster");
        assert_eq!(id.id().unwrap(), CLUSTER);
        let parsed: ClusterId = CLUSTER.parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.cluster_name, "kustocluster");
    }

    #[test]
    fn typed_id_errors_come_from_the_codec() {
        let err = ClusterId::parse("/subscriptions/0000/resourceGroups/").unwrap_err();
        assert_eq!(
            err,
            ResourceIdError::MissingSegment {
                field: "resourceGroupName",
                position: 4,
            }
        );
        assert!(ClusterId::validate(&CLUSTER.to_uppercase()).is_err());
        assert!(ClusterId::parse_insensitively(&CLUSTER.to_uppercase()).is_ok());
    }

    #[test]
    fn generic_conversion_checks_the_schema() {
        let generic = ClusterId::new("s", "rg", "c").to_resource_id();
        assert_eq!(generic.get("clusterName"), Some("c"));
        assert_eq!(
            ClusterId::from_resource_id(generic),
            Some(ClusterId::new("s", "rg", "c"))
        );

        static OTHER: crate::resource_id::ResourceIdSchema =
            crate::resource_id::ResourceIdSchema::new(
                "Other",
                &[Segment::literal("subscriptions"), Segment::value("subscriptionId")],
            );
        assert_eq!(ClusterId::from_resource_id(ResourceId::new(&OTHER, ["s"])), None);
    }

    #[test]
    fn typed_id_json_round_trip() {
        let id = ClusterId::new("0000", "example-rg", "kustocluster");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", CLUSTER));
        let back: ClusterId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ClusterId>("\"/nope\"").is_err());
    }

    #[test]
    fn display_names_the_resource_type() {
        let id = ClusterId::new("0000", "example-rg", "kustocluster");
        assert_eq!(
            id.to_string(),
            "Kusto Cluster (Subscription Id: \"0000\" / Resource Group Name: \"example-rg\" / Cluster Name: \"kustocluster\")"
        );
    }
}
