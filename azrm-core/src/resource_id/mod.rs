//! Resource ID - Structured identifiers for Azure Resource Manager resources
//!
//! Every ARM resource is addressed by a hierarchical path such as
//! `/subscriptions/{id}/resourceGroups/{rg}/providers/Microsoft.Kusto/clusters/{name}`.
//! A [`ResourceIdSchema`] describes one resource type's path as an ordered list
//! of [`Segment`]s, and the single codec in this module parses and formats
//! every schema. Typed wrappers with named fields are generated by
//! [`define_resource_id!`](crate::define_resource_id).

pub mod arm;
mod error;
mod macros;

pub use error::ResourceIdError;

use std::fmt;

use serde::{Serialize, Serializer};

/// One `/`-delimited component of a resource ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Fixed keyword, matched ignoring ASCII case and always emitted as written here
    Literal(&'static str),
    /// User-supplied value kept verbatim (the payload is the field name)
    Value(&'static str),
}

impl Segment {
    pub const fn literal(text: &'static str) -> Self {
        Segment::Literal(text)
    }

    pub const fn value(field: &'static str) -> Self {
        Segment::Value(field)
    }
}

/// How literal segments are compared while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiteralCasing {
    /// Literals must match ignoring case and also carry their canonical casing
    #[default]
    Canonical,
    /// Literals may use any ASCII casing
    Insensitive,
}

/// The shape of one resource type's ID
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ResourceIdSchema {
    name: &'static str,
    segments: &'static [Segment],
}

impl ResourceIdSchema {
    pub const fn new(name: &'static str, segments: &'static [Segment]) -> Self {
        Self { name, segments }
    }

    /// Human readable name of the resource type (e.g., "Kusto Cluster")
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn segments(&self) -> &'static [Segment] {
        self.segments
    }

    /// Names of the value segments, in path order
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Value(field) => Some(*field),
            Segment::Literal(_) => None,
        })
    }

    pub fn field_count(&self) -> usize {
        self.fields().count()
    }

    /// The path with `{field}` placeholders in place of values
    pub fn template(&self) -> String {
        let mut out = String::new();
        for segment in self.segments {
            out.push('/');
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Value(field) => {
                    out.push('{');
                    out.push_str(field);
                    out.push('}');
                }
            }
        }
        out
    }

    /// Parse an ID whose literal segments use canonical casing
    pub fn parse(&'static self, input: &str) -> Result<ResourceId, ResourceIdError> {
        self.parse_with(input, LiteralCasing::Canonical)
    }

    /// Parse an ID, accepting any casing of the literal segments
    pub fn parse_insensitively(&'static self, input: &str) -> Result<ResourceId, ResourceIdError> {
        self.parse_with(input, LiteralCasing::Insensitive)
    }

    pub fn parse_with(
        &'static self,
        input: &str,
        casing: LiteralCasing,
    ) -> Result<ResourceId, ResourceIdError> {
        if input.is_empty() {
            return Err(ResourceIdError::malformed("input is empty"));
        }
        let Some(rest) = input.strip_prefix('/') else {
            return Err(ResourceIdError::malformed(format!(
                "expected a leading `/` in {:?}",
                input
            )));
        };
        if rest.is_empty() {
            return Err(ResourceIdError::malformed("no segments after the leading `/`"));
        }

        let parts: Vec<&str> = rest.split('/').collect();
        let mut values = Vec::with_capacity(self.field_count());

        for (index, segment) in self.segments.iter().enumerate() {
            let position = index + 1;
            let actual = parts.get(index).copied();
            match *segment {
                Segment::Literal(expected) => match actual {
                    Some(a) if a.eq_ignore_ascii_case(expected) => {
                        if casing == LiteralCasing::Canonical && a != expected {
                            return Err(ResourceIdError::LiteralCasing {
                                expected,
                                position,
                                actual: a.to_string(),
                            });
                        }
                    }
                    _ => {
                        return Err(ResourceIdError::SegmentMismatch {
                            expected,
                            position,
                            actual: actual.map(str::to_string),
                        });
                    }
                },
                Segment::Value(field) => match actual {
                    Some(v) if !v.is_empty() => values.push(v.to_string()),
                    _ => return Err(ResourceIdError::MissingSegment { field, position }),
                },
            }
        }

        if parts.len() > self.segments.len() {
            return Err(ResourceIdError::UnexpectedSegments {
                position: self.segments.len() + 1,
                remainder: parts[self.segments.len()..].join("/"),
            });
        }

        Ok(ResourceId {
            schema: self,
            values,
        })
    }

    /// Check that `input` is a valid ID for this schema
    pub fn validate(&'static self, input: &str) -> Result<(), ResourceIdError> {
        self.parse(input).map(|_| ())
    }

    /// Format values (in field order) into the canonical path
    pub fn format<S: AsRef<str>>(&self, values: &[S]) -> Result<String, ResourceIdError> {
        let mut values = values.iter();
        let mut out = String::new();
        for segment in self.segments {
            out.push('/');
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Value(field) => match values.next().map(AsRef::as_ref) {
                    Some(v) if !v.is_empty() => out.push_str(v),
                    _ => return Err(ResourceIdError::IncompleteIdentifier { field }),
                },
            }
        }
        Ok(out)
    }
}

/// A parsed or constructed resource ID
///
/// Holds the value segments in schema order; literals come from the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    schema: &'static ResourceIdSchema,
    values: Vec<String>,
}

impl ResourceId {
    /// Build an ID from values given in field order.
    ///
    /// Missing values are left empty (and make [`ResourceId::id`] fail);
    /// values beyond the schema's field count are dropped.
    pub fn new<I, S>(schema: &'static ResourceIdSchema, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
        values.resize(schema.field_count(), String::new());
        Self { schema, values }
    }

    pub fn schema(&self) -> &'static ResourceIdSchema {
        self.schema
    }

    /// Value of a field by name (e.g., "clusterName")
    pub fn get(&self, field: &str) -> Option<&str> {
        self.schema
            .fields()
            .position(|f| f == field)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    /// Whether every value segment is non-empty
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| !v.is_empty())
    }

    /// The canonical path string
    pub fn id(&self) -> Result<String, ResourceIdError> {
        self.schema.format(&self.values)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.schema.name)?;
        for (i, (field, value)) in self.schema.fields().zip(&self.values).enumerate() {
            if i > 0 {
                write!(f, " / ")?;
            }
            write!(f, "{}: {:?}", humanize(field), value)?;
        }
        write!(f, ")")
    }
}

impl Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let id = self.id().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&id)
    }
}

/// "resourceGroupName" -> "Resource Group Name"
fn humanize(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for (i, c) in field.chars().enumerate() {
        if i == 0 {
            out.push(c.to_ascii_uppercase());
        } else if c.is_ascii_uppercase() {
            out.push(' ');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}
