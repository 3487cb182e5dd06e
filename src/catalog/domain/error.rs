//! Error types for catalog domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing catalog domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogDomainError {
    /// The group name is empty after trimming.
    #[error("table group name must not be empty")]
    EmptyGroupName,

    /// The mark name is empty after trimming.
    #[error("mark name must not be empty")]
    EmptyMarkName,

    /// A group selection contains no group.
    #[error("at least one table group must be selected")]
    EmptyGroupSelection,

    /// The schema name of a group definition entry is empty.
    #[error("schema name must not be empty")]
    EmptySchemaName,

    /// The table or sequence name of a group definition entry is empty.
    #[error("table or sequence name must not be empty")]
    EmptyRelationName,
}

/// Error returned while parsing a relation kind from the catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown relation kind: {0}")]
pub struct ParseRelationKindError(pub String);
