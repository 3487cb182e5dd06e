//! Logical operations understood by the dialect translator.
//!
//! An operation names an administrative question or action independently of
//! the installed extension version. [`super::Dialect::render`] turns it into
//! the concrete [`super::Statement`] for one version.

use crate::catalog::domain::{
    DefinitionKey, GroupDefinition, GroupName, GroupSelection, MarkName, RelationKind,
};
use crate::rollback::domain::RollbackId;

/// Every logical operation, grouped by concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Table group queries and commands.
    Group(GroupOperation),
    /// Mark queries and commands.
    Mark(MarkOperation),
    /// Group definition editing.
    Definition(DefinitionOperation),
    /// Log statistics.
    Stat(StatOperation),
    /// Rollback execution and monitoring.
    Rollback(RollbackCommand),
}

/// Table group queries and commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOperation {
    /// Name and comment of every group.
    List,
    /// Groups that are not logging.
    ListIdle,
    /// Groups that are logging.
    ListLogging,
    /// Groups present in the definition table but not created yet.
    ListNew,
    /// Properties and log size of one group.
    Get {
        /// Group to read.
        group: GroupName,
    },
    /// Logging and rollbackable state of a set of groups.
    States {
        /// Groups to read.
        groups: GroupSelection,
    },
    /// Rollbackable flag of one group.
    IsRollbackable {
        /// Group to read.
        group: GroupName,
    },
    /// Tables and sequences of one group.
    Content {
        /// Group to read.
        group: GroupName,
    },
    /// Creates a group from its definition rows.
    Create {
        /// Group to create.
        group: GroupName,
        /// Rollbackable or audit-only.
        is_rollbackable: bool,
    },
    /// Drops a group.
    Drop {
        /// Group to drop.
        group: GroupName,
    },
    /// Applies definition changes to a created group.
    Alter {
        /// Group to alter.
        group: GroupName,
    },
    /// Sets or clears the comment of a group.
    Comment {
        /// Group to comment.
        group: GroupName,
        /// New comment, `None` clears it.
        comment: Option<String>,
    },
    /// Starts logging.
    Start {
        /// Groups to start.
        groups: GroupSelection,
        /// Initial mark.
        mark: MarkName,
        /// Whether the log tables are purged first.
        reset_log: bool,
    },
    /// Stops logging.
    Stop {
        /// Groups to stop.
        groups: GroupSelection,
        /// Optional final mark.
        mark: Option<MarkName>,
    },
    /// Stops a damaged group regardless of its state.
    ForceStop {
        /// Group to stop.
        group: GroupName,
    },
    /// Purges the log tables of an idle group.
    Reset {
        /// Group to reset.
        group: GroupName,
    },
    /// Disk footprint of the extension.
    ExtensionSize,
    /// Consistency check of the whole extension.
    VerifyAll,
}

/// Mark queries and commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOperation {
    /// Marks of a group, newest first.
    List {
        /// Owning group.
        group: GroupName,
    },
    /// One mark.
    Get {
        /// Owning group.
        group: GroupName,
        /// Mark to read.
        mark: MarkName,
    },
    /// Number of marks named `mark` across `groups`.
    CountNamed {
        /// Groups to search.
        groups: GroupSelection,
        /// Mark name.
        mark: MarkName,
    },
    /// Number of active marks in a group.
    CountActive {
        /// Owning group.
        group: GroupName,
    },
    /// Whether a mark is the oldest of its group.
    IsFirst {
        /// Owning group.
        group: GroupName,
        /// Mark to test.
        mark: MarkName,
    },
    /// Sets a mark.
    Set {
        /// Groups to mark.
        groups: GroupSelection,
        /// New mark name.
        mark: MarkName,
    },
    /// Sets or clears the comment of a mark.
    Comment {
        /// Owning group.
        group: GroupName,
        /// Mark to comment.
        mark: MarkName,
        /// New comment, `None` clears it.
        comment: Option<String>,
    },
    /// Deletes a mark.
    Delete {
        /// Owning group.
        group: GroupName,
        /// Mark to delete.
        mark: MarkName,
    },
    /// Deletes every mark older than `mark`.
    DeleteBefore {
        /// Owning group.
        group: GroupName,
        /// Oldest mark kept.
        mark: MarkName,
    },
    /// Renames a mark.
    Rename {
        /// Owning group.
        group: GroupName,
        /// Current name.
        mark: MarkName,
        /// New name.
        new_name: MarkName,
    },
    /// Active marks usable as a rollback target for every group.
    RollbackTargets {
        /// Groups to roll back.
        groups: GroupSelection,
    },
    /// Number of groups for which `mark` is an active rollback target.
    CountRollbackTargets {
        /// Groups to roll back.
        groups: GroupSelection,
        /// Target mark.
        mark: MarkName,
    },
}

/// Group definition editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionOperation {
    /// Application schemas plus schemas only known to the definition table.
    ListSchemas,
    /// Tables and sequences of a schema with their assignment.
    ListTablesSequences {
        /// Schema to list.
        schema: String,
    },
    /// Group names present in the definition table.
    KnownGroups,
    /// Log schema suffixes present in the definition table.
    KnownSuffixes,
    /// Non-system tablespaces.
    KnownTablespaces,
    /// Catalog kind of a relation.
    RelationKind {
        /// Schema of the relation.
        schema: String,
        /// Relation name.
        tblseq: String,
    },
    /// Inserts a definition row.
    Assign {
        /// Row to insert.
        definition: GroupDefinition,
        /// Kind of the assigned relation.
        kind: RelationKind,
    },
    /// Updates the definition row of a relation.
    Update {
        /// New row content.
        definition: GroupDefinition,
        /// Kind of the assigned relation.
        kind: RelationKind,
    },
    /// Deletes a definition row.
    Remove {
        /// Row to delete.
        key: DefinitionKey,
    },
}

/// Log statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatOperation {
    /// Rows logged per table between two marks.
    Log {
        /// Group to inspect.
        group: GroupName,
        /// Start mark.
        first_mark: MarkName,
        /// End mark, current state when absent.
        last_mark: Option<MarkName>,
    },
    /// Rows logged per table, role and verb between two marks.
    DetailedLog {
        /// Group to inspect.
        group: GroupName,
        /// Start mark.
        first_mark: MarkName,
        /// End mark, current state when absent.
        last_mark: Option<MarkName>,
    },
    /// Rows and tables a rollback to `mark` would revert.
    GlobalRollback {
        /// Group to inspect.
        group: GroupName,
        /// Target mark.
        mark: MarkName,
    },
    /// Estimated duration of a rollback to `mark`.
    EstimateRollback {
        /// Group to inspect.
        group: GroupName,
        /// Target mark.
        mark: MarkName,
    },
}

/// Rollback execution and monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackCommand {
    /// Synchronous rollback.
    Execute {
        /// Groups to roll back.
        groups: GroupSelection,
        /// Target mark.
        mark: MarkName,
        /// Whether the reverting changes are logged.
        is_logged: bool,
    },
    /// Registers an asynchronous rollback and returns its identifier.
    InitAsync {
        /// Groups to roll back.
        groups: GroupSelection,
        /// Target mark.
        mark: MarkName,
        /// Whether the reverting changes are logged.
        is_logged: bool,
    },
    /// Runs a registered rollback; handed to the external client.
    ExecuteAsync {
        /// Registered operation.
        id: RollbackId,
    },
    /// In-flight operations, optionally narrowed to one identifier.
    Activity {
        /// Operation to report.
        id: Option<RollbackId>,
    },
    /// Marks operations whose session died as aborted.
    CleanupState,
    /// Finished operations, newest first.
    Completed {
        /// Maximum number of operations returned.
        limit: Option<i64>,
        /// Only operations ended within this many hours.
        retention_hours: Option<i32>,
    },
}

impl From<GroupOperation> for Operation {
    fn from(value: GroupOperation) -> Self {
        Self::Group(value)
    }
}

impl From<MarkOperation> for Operation {
    fn from(value: MarkOperation) -> Self {
        Self::Mark(value)
    }
}

impl From<DefinitionOperation> for Operation {
    fn from(value: DefinitionOperation) -> Self {
        Self::Definition(value)
    }
}

impl From<StatOperation> for Operation {
    fn from(value: StatOperation) -> Self {
        Self::Stat(value)
    }
}

impl From<RollbackCommand> for Operation {
    fn from(value: RollbackCommand) -> Self {
        Self::Rollback(value)
    }
}
