//! Error types for diff runs and their queries.

use thiserror::Error;

/// Errors that can occur while computing or querying a diff.
#[derive(Debug, Error)]
pub enum DiffError {
    /// Groups hold different numbers of revisions.
    #[error("group {group:?} has {actual} revisions, expected {expected}")]
    RevisionCountMismatch {
        group: String,
        expected: usize,
        actual: usize,
    },

    /// Two documents at the same revision index carry different text.
    #[error("revision {revision} of group {group:?} has different text than group {reference:?}")]
    TextMismatch {
        revision: usize,
        group: String,
        reference: String,
    },

    /// A type produced both span and arc positions in one run.
    #[error("type {type_name:?} produced both span and arc positions")]
    PositionShapeMismatch { type_name: String },

    /// A configuration set passed to a query does not belong to this result.
    #[error("configuration set does not belong to this diff result")]
    ForeignConfigurationSet,

    /// More than one adapter was supplied for a type.
    #[error("more than one adapter supplied for type {type_name:?}")]
    DuplicateAdapter { type_name: String },

    /// Scope span with `begin > end`.
    #[error("invalid span {begin}-{end}")]
    InvalidSpan { begin: usize, end: usize },

    /// Layer schema or options could not be read.
    #[error("schema error: {0}")]
    Schema(String),
}

impl From<toml::de::Error> for DiffError {
    fn from(err: toml::de::Error) -> Self {
        DiffError::Schema(err.to_string())
    }
}

