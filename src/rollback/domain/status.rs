//! Rollback operation status machine.

use super::ParseRollbackStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a rollback operation as recorded by the extension.
///
/// ```text
/// PLANNING -> SESSION_LOCKED -> EXECUTING -> COMPLETED -> COMMITTED
///                                         \-> ABORTED  -> COMMITTED
/// ```
///
/// Any status before completion may also move to `ABORTED` when the backing
/// session dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RollbackStatus {
    /// The operation is registered and being planned.
    Planning,
    /// The sessions are locking the application tables.
    #[serde(rename = "LOCKING", alias = "SESSION_LOCKED")]
    SessionLocked,
    /// Log rows are being reverted.
    Executing,
    /// Reverting finished, the transaction is not yet committed.
    Completed,
    /// The operation is committed.
    Committed,
    /// The operation failed or its session disappeared.
    Aborted,
}

impl RollbackStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "PLANNING",
            Self::SessionLocked => "LOCKING",
            Self::Executing => "EXECUTING",
            Self::Completed => "COMPLETED",
            Self::Committed => "COMMITTED",
            Self::Aborted => "ABORTED",
        }
    }

    /// Whether the operation is still running server-side.
    #[must_use]
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::Planning | Self::SessionLocked | Self::Executing)
    }

    /// Whether the status belongs in the completed-operations listing.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Committed | Self::Aborted)
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Planning, Self::SessionLocked)
                | (Self::SessionLocked, Self::Executing)
                | (Self::Executing, Self::Completed)
                | (Self::Completed | Self::Aborted, Self::Committed)
                | (
                    Self::Planning | Self::SessionLocked | Self::Executing,
                    Self::Aborted
                )
        )
    }
}

impl fmt::Display for RollbackStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RollbackStatus {
    type Error = ParseRollbackStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "PLANNING" => Ok(Self::Planning),
            "LOCKING" | "SESSION_LOCKED" => Ok(Self::SessionLocked),
            "EXECUTING" => Ok(Self::Executing),
            "COMPLETED" => Ok(Self::Completed),
            "COMMITTED" => Ok(Self::Committed),
            "ABORTED" => Ok(Self::Aborted),
            _ => Err(ParseRollbackStatusError(value.to_owned())),
        }
    }
}
