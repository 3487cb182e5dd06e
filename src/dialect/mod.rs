//! Dialect translator.
//!
//! Renders every [`Operation`] into the statement understood by the installed
//! extension version. Version-sensitive choices are looked up once per
//! concept in [`DialectRules`]; statements that must run before the version
//! is known live in [`bootstrap`].

pub mod bootstrap;
mod operation;
mod render;
mod statement;
mod thresholds;

pub use operation::{
    DefinitionOperation, GroupOperation, MarkOperation, Operation, RollbackCommand,
    StatOperation,
};
pub use statement::{quote_ident, quote_literal, SqlParam, Statement, StatementBuilder};
pub use thresholds::{
    DefinitionColumns, DialectRules, Estimator, LogLocation, LoggingState, MarkState,
    VERSION_1_0_0, VERSION_1_1_0, VERSION_1_2_0,
};

/// Statement renderer bound to one extension schema and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    schema: String,
    quoted_schema: String,
    numeric_version: u32,
    rules: DialectRules,
}

impl Dialect {
    /// Creates a dialect for the extension installed in `schema` at
    /// `numeric_version` (`0` when unknown).
    #[must_use]
    pub fn new(schema: impl Into<String>, numeric_version: u32) -> Self {
        let schema_name = schema.into();
        Self {
            quoted_schema: quote_ident(&schema_name),
            schema: schema_name,
            numeric_version,
            rules: DialectRules::for_version(numeric_version),
        }
    }

    /// Returns the unquoted extension schema name.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the quoted extension schema identifier.
    #[must_use]
    pub fn quoted_schema(&self) -> &str {
        &self.quoted_schema
    }

    /// Returns the numeric version the dialect was built for.
    #[must_use]
    pub const fn numeric_version(&self) -> u32 {
        self.numeric_version
    }

    /// Returns the decision table row in effect.
    #[must_use]
    pub const fn rules(&self) -> DialectRules {
        self.rules
    }

    /// Renders `operation` for this version.
    #[must_use]
    pub fn render(&self, operation: &Operation) -> Statement {
        match operation {
            Operation::Group(group) => render::groups::render(self, group),
            Operation::Mark(mark) => render::marks::render(self, mark),
            Operation::Definition(definition) => render::definition::render(self, definition),
            Operation::Stat(stat) => render::stats::render(self, stat),
            Operation::Rollback(rollback) => render::rollback::render(self, rollback),
        }
    }
}
