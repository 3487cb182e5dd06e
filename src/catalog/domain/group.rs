//! Table group read models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RelationKind;

/// Whether a group can be rolled back or only audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupType {
    /// Log rows can be used to roll the group back.
    Rollbackable,
    /// Changes are recorded for audit only.
    AuditOnly,
}

impl GroupType {
    /// Maps the extension's `group_is_rollbackable` flag.
    #[must_use]
    pub const fn from_rollbackable(is_rollbackable: bool) -> Self {
        if is_rollbackable {
            Self::Rollbackable
        } else {
            Self::AuditOnly
        }
    }

    /// Returns the canonical display form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rollbackable => "ROLLBACKABLE",
            Self::AuditOnly => "AUDIT_ONLY",
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group name and comment, as listed for every group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group name.
    pub name: String,
    /// Optional group comment.
    pub comment: Option<String>,
}

/// A created table group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGroup {
    /// Group name.
    pub name: String,
    /// Whether the group can be rolled back.
    pub is_rollbackable: bool,
    /// Whether the group is currently recording changes.
    pub is_logging: bool,
    /// Number of tables in the group.
    pub table_count: i64,
    /// Number of sequences in the group.
    pub sequence_count: i64,
    /// Optional group comment.
    pub comment: Option<String>,
    /// Group creation time.
    pub created_at: DateTime<Utc>,
    /// Number of marks recorded for the group.
    pub mark_count: i64,
}

impl TableGroup {
    /// Returns the group type derived from the rollbackable flag.
    #[must_use]
    pub const fn group_type(&self) -> GroupType {
        GroupType::from_rollbackable(self.is_rollbackable)
    }
}

/// Current type and logging state of a group, read before a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    /// Group name.
    pub name: String,
    /// Whether the group can be rolled back.
    pub is_rollbackable: bool,
    /// Whether the group is currently recording changes.
    pub is_logging: bool,
}

/// A group with its total log size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetail {
    /// Group properties.
    pub group: TableGroup,
    /// Pretty-printed size of all log tables of the group.
    pub log_size: Option<String>,
}

/// One table or sequence belonging to a created group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRelation {
    /// Schema of the application table or sequence.
    pub schema: String,
    /// Table or sequence name.
    pub name: String,
    /// Relation kind.
    pub kind: RelationKind,
    /// Processing priority.
    pub priority: Option<i64>,
    /// Schema holding the log table, when the version records it.
    pub log_schema: Option<String>,
    /// Tablespace of the log table.
    pub log_data_tablespace: Option<String>,
    /// Tablespace of the log index.
    pub log_index_tablespace: Option<String>,
    /// Prefix of the extension objects created for the relation.
    pub names_prefix: Option<String>,
    /// Log table size in bytes, for tables only.
    pub log_size_bytes: Option<i64>,
    /// Pretty-printed log table size, for tables only.
    pub log_size_pretty: Option<String>,
}
