//! Error types for rollback domain parsing.

use thiserror::Error;

/// Errors returned by rollback domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RollbackDomainError {
    /// The rollback identifier is not positive.
    #[error("invalid rollback identifier {0}, expected a positive integer")]
    InvalidRollbackId(i64),
}

/// Error returned while parsing a rollback status from the extension.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown rollback status: {0}")]
pub struct ParseRollbackStatusError(pub String);
