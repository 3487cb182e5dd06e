//! Domain model for the extension catalog: groups, marks, group definition
//! entries and log statistics.
//!
//! These types describe the extension's metadata as this layer sees it. The
//! rows themselves belong to the extension; nothing here is persisted by the
//! gateway.

mod definition;
mod error;
mod group;
mod mark;
mod names;
mod precondition;
mod stats;

pub use definition::{
    DefinitionKey, GroupDefinition, RelationKind, SchemaEntry, TableSequenceEntry,
};
pub use error::{CatalogDomainError, ParseRelationKindError};
pub use group::{
    GroupDetail, GroupRelation, GroupState, GroupSummary, GroupType, TableGroup,
};
pub use mark::{Mark, RollbackTargetMark, accumulate_log_rows};
pub use names::{GroupName, GroupSelection, MarkName};
pub use precondition::StalePrecondition;
pub use stats::{
    DetailedLogStatEntry, DetailedLogStatReport, DetailedLogStatSummary, LogStatEntry,
    LogStatReport, LogStatSummary,
};
