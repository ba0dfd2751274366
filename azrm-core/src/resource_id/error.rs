//! Error types for resource ID parsing and formatting

use thiserror::Error;

/// Errors that can occur when parsing or formatting a resource ID.
///
/// Parsing is fail-fast: the error describes the first segment, in schema
/// order, that did not satisfy the schema. Positions are 1-based indices of
/// the segment within the path, not counting the leading `/`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceIdError {
    /// The input is empty, lacks the leading `/`, or contains no segments.
    #[error("malformed resource ID: {reason}")]
    MalformedInput { reason: String },

    /// A value segment is absent or empty.
    #[error("segment {position}: missing value for `{field}`")]
    MissingSegment { field: &'static str, position: usize },

    /// A literal segment is absent or does not match.
    #[error(
        "segment {position}: expected `{expected}` but got {}",
        describe_actual(.actual)
    )]
    SegmentMismatch {
        expected: &'static str,
        position: usize,
        actual: Option<String>,
    },

    /// A literal segment matched ignoring case but not in canonical casing.
    #[error(
        "segment {position}: expected `{expected}` but got `{actual}` (literal segments are case-sensitive here, parse insensitively to accept other casings)"
    )]
    LiteralCasing {
        expected: &'static str,
        position: usize,
        actual: String,
    },

    /// The input continues past the last segment of the schema.
    #[error("segment {position}: unexpected trailing segments `{remainder}`")]
    UnexpectedSegments { position: usize, remainder: String },

    /// A value segment was left empty when formatting.
    #[error("cannot format resource ID: value for `{field}` is empty")]
    IncompleteIdentifier { field: &'static str },
}

impl ResourceIdError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Position of the offending segment, if the error is tied to one.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::MissingSegment { position, .. }
            | Self::SegmentMismatch { position, .. }
            | Self::LiteralCasing { position, .. }
            | Self::UnexpectedSegments { position, .. } => Some(*position),
            Self::MalformedInput { .. } | Self::IncompleteIdentifier { .. } => None,
        }
    }
}

fn describe_actual(actual: &Option<String>) -> String {
    match actual.as_deref() {
        None => "end of input".to_string(),
        Some("") => "an empty segment".to_string(),
        Some(s) => format!("`{}`", s),
    }
}
