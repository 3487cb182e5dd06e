//! Catalog service errors.

use thiserror::Error;

use crate::catalog::domain::{CatalogDomainError, DefinitionKey, StalePrecondition};
use crate::database::ports::ExecutorError;
use crate::session::AccessError;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors returned by [`super::CatalogService`].
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The extension is absent or the principal lacks the required role.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// An input value failed validation.
    #[error(transparent)]
    Domain(#[from] CatalogDomainError),

    /// The statement failed or its result could not be decoded.
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// The catalog changed since the caller last read it.
    #[error(transparent)]
    StalePrecondition(#[from] StalePrecondition),

    /// A single-row removal matched no row; the transaction was rolled back.
    #[error("no group definition row matches {0}")]
    NoMatch(DefinitionKey),

    /// A single-row removal matched several rows; the transaction was rolled
    /// back.
    #[error("{count} group definition rows match {key}, none was removed")]
    AmbiguousMatch {
        /// Key that was removed.
        key: DefinitionKey,
        /// Rows the removal affected.
        count: u64,
    },
}
