//! Group definition entries staged before a group is created or altered.

use super::{CatalogDomainError, GroupName, ParseRelationKindError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a catalog relation referenced by the group definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// An ordinary table (`r`).
    Table,
    /// A sequence (`S`).
    Sequence,
    /// Listed in the definition but absent from the database (`!`).
    Missing,
}

impl RelationKind {
    /// Returns the catalog code.
    #[must_use]
    pub const fn as_code(self) -> &'static str {
        match self {
            Self::Table => "r",
            Self::Sequence => "S",
            Self::Missing => "!",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl TryFrom<&str> for RelationKind {
    type Error = ParseRelationKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "r" => Ok(Self::Table),
            "S" => Ok(Self::Sequence),
            "!" => Ok(Self::Missing),
            _ => Err(ParseRelationKindError(value.to_owned())),
        }
    }
}

/// Identifies one group definition row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefinitionKey {
    /// Application schema.
    pub schema: String,
    /// Table or sequence name.
    pub tblseq: String,
    /// Group the row assigns the relation to.
    pub group: GroupName,
}

impl DefinitionKey {
    /// Creates a validated key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError`] when the schema or relation name is
    /// blank.
    pub fn new(
        schema: impl Into<String>,
        tblseq: impl Into<String>,
        group: GroupName,
    ) -> Result<Self, CatalogDomainError> {
        let schema_name = schema.into();
        let relation_name = tblseq.into();
        if schema_name.trim().is_empty() {
            return Err(CatalogDomainError::EmptySchemaName);
        }
        if relation_name.trim().is_empty() {
            return Err(CatalogDomainError::EmptyRelationName);
        }
        Ok(Self {
            schema: schema_name,
            tblseq: relation_name,
            group,
        })
    }
}

impl fmt::Display for DefinitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} in group {}", self.schema, self.tblseq, self.group)
    }
}

/// A pending table or sequence assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Relation and target group.
    pub key: DefinitionKey,
    /// Processing priority.
    pub priority: Option<i32>,
    /// Suffix of the dedicated log schema.
    pub log_schema_suffix: Option<String>,
    /// Prefix of the extension objects created for the relation.
    pub names_prefix: Option<String>,
    /// Tablespace of the log table.
    pub log_data_tablespace: Option<String>,
    /// Tablespace of the log index.
    pub log_index_tablespace: Option<String>,
}

impl GroupDefinition {
    /// Creates an entry without optional attributes.
    #[must_use]
    pub const fn new(key: DefinitionKey) -> Self {
        Self {
            key,
            priority: None,
            log_schema_suffix: None,
            names_prefix: None,
            log_data_tablespace: None,
            log_index_tablespace: None,
        }
    }

    /// Sets the processing priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the log schema suffix.
    #[must_use]
    pub fn with_log_schema_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.log_schema_suffix = Some(suffix.into());
        self
    }

    /// Sets the emaj names prefix.
    #[must_use]
    pub fn with_names_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.names_prefix = Some(prefix.into());
        self
    }

    /// Sets the log data and index tablespaces.
    #[must_use]
    pub fn with_tablespaces(
        mut self,
        data_tablespace: impl Into<String>,
        index_tablespace: impl Into<String>,
    ) -> Self {
        self.log_data_tablespace = Some(data_tablespace.into());
        self.log_index_tablespace = Some(index_tablespace.into());
        self
    }

    /// Returns a log attribute as stored for a relation of `kind`.
    ///
    /// Sequences have no log table, so their log attributes are always
    /// stored as `NULL`; blank values are stored as `NULL` too.
    #[must_use]
    pub fn log_attribute(value: Option<&String>, kind: RelationKind) -> Option<String> {
        if kind == RelationKind::Sequence {
            return None;
        }
        value
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
    }
}

/// A schema shown when editing group definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    /// Schema name.
    pub name: String,
    /// Owner role, absent for schemas only known to the definition table.
    pub owner: Option<String>,
    /// Schema comment.
    pub comment: Option<String>,
    /// Whether the schema exists in the database.
    pub exists: bool,
}

/// A table or sequence of a schema with its current assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSequenceEntry {
    /// Schema name.
    pub schema: String,
    /// Relation name.
    pub name: String,
    /// Relation kind.
    pub kind: RelationKind,
    /// Owner role.
    pub owner: Option<String>,
    /// Relation comment.
    pub comment: Option<String>,
    /// Relation tablespace.
    pub tablespace: Option<String>,
    /// Group the relation is assigned to, if any.
    pub group: Option<String>,
    /// Assigned priority.
    pub priority: Option<i64>,
    /// Assigned log schema suffix.
    pub log_schema_suffix: Option<String>,
    /// Assigned emaj names prefix.
    pub names_prefix: Option<String>,
    /// Assigned log data tablespace.
    pub log_data_tablespace: Option<String>,
    /// Assigned log index tablespace.
    pub log_index_tablespace: Option<String>,
}
