//! Error type for rollback orchestration.

use thiserror::Error;

use crate::catalog::domain::StalePrecondition;
use crate::catalog::services::CatalogError;
use crate::database::ports::ExecutorError;
use crate::rollback::domain::{RollbackDomainError, RollbackId};
use crate::rollback::ports::LaunchError;
use crate::session::AccessError;

/// Result type for rollback orchestration.
pub type RollbackResult<T> = Result<T, RollbackError>;

/// Errors returned by [`super::RollbackOrchestrator`].
#[derive(Debug, Clone, Error)]
pub enum RollbackError {
    /// The extension is missing or the principal lacks the required role.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// A catalog read made while checking preconditions failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A monitoring query failed.
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// A value returned by the extension was invalid.
    #[error(transparent)]
    Domain(#[from] RollbackDomainError),

    /// The groups or the mark changed since the request was prepared.
    #[error(transparent)]
    StalePrecondition(#[from] StalePrecondition),

    /// The client path or the scratch directory is missing or unusable.
    #[error("asynchronous rollback is unavailable for this session")]
    AsyncUnavailable,

    /// The extension rejected the rollback.
    #[error("rollback submission failed: {source}")]
    Submission {
        /// Identifier, when the extension issued one before failing.
        id: Option<RollbackId>,
        /// Failure reported by the extension.
        #[source]
        source: ExecutorError,
    },

    /// The rollback was registered but its client could not be started.
    #[error("rollback {id} is registered but its client failed to start: {source}")]
    Launch {
        /// Identifier of the registered operation.
        id: RollbackId,
        /// Launch failure.
        #[source]
        source: LaunchError,
    },
}

impl RollbackError {
    /// Returns the operation identifier carried by submission failures, so
    /// the operation can still be polled.
    #[must_use]
    pub const fn rollback_id(&self) -> Option<RollbackId> {
        match self {
            Self::Submission { id, .. } => *id,
            Self::Launch { id, .. } => Some(*id),
            _ => None,
        }
    }
}
