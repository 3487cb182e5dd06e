//! Rollback operation read models and requests.

use super::{RollbackDomainError, RollbackStatus};
use crate::catalog::domain::{GroupSelection, MarkName};
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-issued identifier of a rollback operation.
///
/// The identifier is the only correlation key between this layer and an
/// asynchronous rollback running in a detached client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollbackId(i64);

impl RollbackId {
    /// Creates a validated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RollbackDomainError::InvalidRollbackId`] when `value` is not
    /// positive.
    pub const fn new(value: i64) -> Result<Self, RollbackDomainError> {
        if value <= 0 {
            return Err(RollbackDomainError::InvalidRollbackId(value));
        }
        Ok(Self(value))
    }

    /// Returns the wrapped value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RollbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request to roll one or more groups back to a mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackRequest {
    /// Groups to roll back.
    pub groups: GroupSelection,
    /// Target mark, common to every group.
    pub mark: MarkName,
    /// Whether the reverting changes are themselves logged.
    pub is_logged: bool,
}

impl RollbackRequest {
    /// Creates an unlogged rollback request.
    #[must_use]
    pub const fn new(groups: GroupSelection, mark: MarkName) -> Self {
        Self {
            groups,
            mark,
            is_logged: false,
        }
    }

    /// Makes the rollback a logged rollback.
    #[must_use]
    pub const fn logged(mut self) -> Self {
        self.is_logged = true;
        self
    }
}

/// A rollback operation recorded by the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackOperation {
    /// Operation identifier.
    pub id: RollbackId,
    /// Rolled back groups.
    pub groups: Vec<String>,
    /// Target mark.
    pub target_mark: String,
    /// Time the target mark was set.
    pub mark_datetime: Option<DateTime<Utc>>,
    /// Whether the rollback is logged.
    pub is_logged: bool,
    /// Current status.
    pub status: RollbackStatus,
    /// Start time.
    pub started_at: Option<DateTime<Utc>>,
    /// End time.
    pub ended_at: Option<DateTime<Utc>>,
    /// Duration rendered as `HH24:MI:SS`.
    pub duration: Option<String>,
    /// Number of sessions used.
    pub session_count: i64,
    /// Number of tables actually processed.
    pub table_count: i64,
    /// Number of sequences processed.
    pub sequence_count: i64,
}

/// Progress of an in-flight rollback operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackProgress {
    /// Operation identifier.
    pub id: RollbackId,
    /// Rolled back groups.
    pub groups: Vec<String>,
    /// Target mark.
    pub target_mark: String,
    /// Whether the rollback is logged.
    pub is_logged: bool,
    /// Current status.
    pub status: RollbackStatus,
    /// Number of sessions used.
    pub session_count: i64,
    /// Number of tables in the groups.
    pub table_count: i64,
    /// Number of sequences in the groups.
    pub sequence_count: i64,
    /// Start time.
    pub started_at: Option<DateTime<Utc>>,
    /// Elapsed time rendered as `HH24:MI:SS`.
    pub elapsed: Option<String>,
    /// Estimated remaining time, as reported by the extension.
    pub remaining: Option<String>,
    /// Completion percentage.
    pub completion_pct: Option<i64>,
}

/// Receipt of an asynchronous rollback submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncRollbackTicket {
    /// Identifier to poll the operation with.
    pub rollback_id: RollbackId,
    /// File receiving the detached client's output.
    pub report_path: Utf8PathBuf,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

/// Volume and estimated duration of a rollback to a mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackEstimate {
    /// Log rows to revert.
    pub rows: i64,
    /// Tables with rows to revert.
    pub tables: i64,
    /// Estimated duration rendered as `HH24:MI:SS`.
    pub duration: Option<String>,
}
