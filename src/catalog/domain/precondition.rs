//! Conditions re-checked immediately before a mutation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The catalog no longer satisfies what a mutation requires.
///
/// Reported separately from execution failures so that callers can explain
/// what changed since the state was last displayed.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum StalePrecondition {
    /// A group does not exist (any more).
    #[error("table group {0} does not exist")]
    UnknownGroup(String),

    /// Groups must be idle but are logging.
    #[error("table groups are not idle: {}", .0.join(", "))]
    GroupsNotIdle(Vec<String>),

    /// Groups must be logging but are idle.
    #[error("table groups are not logging: {}", .0.join(", "))]
    GroupsNotLogging(Vec<String>),

    /// Groups must be rollbackable but are audit-only.
    #[error("table groups are not rollbackable: {}", .0.join(", "))]
    GroupsNotRollbackable(Vec<String>),

    /// A new mark name is already used by one of the groups.
    #[error("mark {0} already exists")]
    MarkAlreadyExists(String),

    /// A mark does not exist for the group.
    #[error("mark {mark} does not exist in group {group}")]
    UnknownMark {
        /// Group searched.
        group: String,
        /// Mark name.
        mark: String,
    },

    /// A mark is no longer a rollback target for every selected group.
    #[error("mark {0} is not an active mark of every selected group")]
    MarkNotActive(String),
}
