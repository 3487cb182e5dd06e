//! Version thresholds and the per-concept dialect decision table.
//!
//! Every version-sensitive rendering choice is made here, once per concept.
//! Renderers ask the [`DialectRules`] for a fragment instead of comparing
//! version numbers themselves.

use super::statement::{quote_literal, StatementBuilder};

/// First release keeping log tables in per-relation log schemas.
pub const VERSION_1_0_0: u32 = 10_000;

/// First release exposing boolean state flags and the three-argument
/// rollback estimator.
pub const VERSION_1_1_0: u32 = 10_100;

/// First release recording log table and log function names per relation.
pub const VERSION_1_2_0: u32 = 10_200;

/// How a group's logging state is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingState {
    /// `group_is_logging` boolean column.
    Flag,
    /// `group_state` text column holding `IDLE` or `LOGGING`.
    TextState,
}

impl LoggingState {
    /// Boolean expression, true when the group is logging.
    #[must_use]
    pub const fn is_logging_column(self) -> &'static str {
        match self {
            Self::Flag => "group_is_logging",
            Self::TextState => "(group_state = 'LOGGING')",
        }
    }

    /// Filter selecting groups in the requested state.
    #[must_use]
    pub const fn predicate(self, logging: bool) -> &'static str {
        match (self, logging) {
            (Self::Flag, true) => "group_is_logging",
            (Self::Flag, false) => "NOT group_is_logging",
            (Self::TextState, true) => "group_state = 'LOGGING'",
            (Self::TextState, false) => "group_state = 'IDLE'",
        }
    }
}

/// How a mark's deletion state is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkState {
    /// `mark_is_deleted` boolean column.
    Flag,
    /// `mark_state` text column holding `ACTIVE` or `DELETED`.
    TextState,
}

impl MarkState {
    /// Boolean expression, true when the mark is deleted.
    #[must_use]
    pub const fn is_deleted_column(self) -> &'static str {
        match self {
            Self::Flag => "mark_is_deleted",
            Self::TextState => "(mark_state = 'DELETED')",
        }
    }

    /// Filter selecting active marks.
    #[must_use]
    pub const fn active_predicate(self) -> &'static str {
        match self {
            Self::Flag => "NOT mark_is_deleted",
            Self::TextState => "mark_state = 'ACTIVE'",
        }
    }
}

/// Where the log table of a relation lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLocation {
    /// All log tables live in the extension schema.
    FixedSchema,
    /// Each relation names its log schema in `rel_log_schema`.
    PerRelationSchema,
    /// Each relation names both its log schema and its log table.
    PerRelationTable,
}

impl LogLocation {
    /// Whether `emaj_relation` has the `rel_log_schema` column.
    #[must_use]
    pub const fn has_log_schema(self) -> bool {
        !matches!(self, Self::FixedSchema)
    }

    /// Text expression yielding the quoted, schema-qualified log table name
    /// of the current `emaj_relation` row.
    #[must_use]
    pub fn log_table_expr(self, extension_schema: &str) -> String {
        const DERIVED_TABLE: &str = "quote_ident(rel_schema || '_' || rel_tblseq || '_log')";
        match self {
            Self::FixedSchema => format!(
                "quote_ident({}) || '.' || {DERIVED_TABLE}",
                quote_literal(extension_schema)
            ),
            Self::PerRelationSchema => {
                format!("quote_ident(rel_log_schema) || '.' || {DERIVED_TABLE}")
            }
            Self::PerRelationTable => {
                "quote_ident(rel_log_schema) || '.' || quote_ident(rel_log_table)".to_owned()
            }
        }
    }

    /// Select-list fragment reporting the log attributes of an
    /// `emaj_relation` row, `NULL` where the version does not record them.
    #[must_use]
    pub const fn relation_attributes(self) -> &'static str {
        match self {
            Self::FixedSchema => {
                "NULL::text AS rel_log_schema, NULL::text AS rel_log_dat_tsp, \
                 NULL::text AS rel_log_idx_tsp, NULL::text AS emaj_names_prefix"
            }
            Self::PerRelationSchema => {
                "rel_log_schema, rel_log_dat_tsp, rel_log_idx_tsp, \
                 NULL::text AS emaj_names_prefix"
            }
            Self::PerRelationTable => {
                "rel_log_schema, rel_log_dat_tsp, rel_log_idx_tsp, \
                 substring(rel_log_function FROM '(.*)\\_log\\_fnct') AS emaj_names_prefix"
            }
        }
    }
}

/// Shape of the rollback duration estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimator {
    /// `emaj_estimate_rollback_duration(group, mark)`.
    TwoArguments,
    /// `emaj_estimate_rollback_group(group, mark, is_logged)`.
    ThreeArguments,
}

impl Estimator {
    /// Appends the estimator call for `group` and `mark`.
    pub fn push_call(self, builder: &mut StatementBuilder, schema: &str, group: &str, mark: &str) {
        match self {
            Self::TwoArguments => {
                builder.push(schema).push_bind(".emaj_estimate_rollback_duration(", group);
                builder.push_bind(", ", mark).push(")");
            }
            Self::ThreeArguments => {
                builder.push(schema).push_bind(".emaj_estimate_rollback_group(", group);
                builder.push_bind(", ", mark).push(", false)");
            }
        }
    }
}

/// Optional columns of `emaj_group_def`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionColumns {
    /// `grpdef_log_schema_suffix` exists.
    pub log_schema_suffix: bool,
    /// `grpdef_emaj_names_prefix` exists.
    pub names_prefix: bool,
    /// `grpdef_log_dat_tsp` and `grpdef_log_idx_tsp` exist.
    pub tablespaces: bool,
}

impl DefinitionColumns {
    /// Select-list fragment reporting every optional column, `NULL` when
    /// absent from the installed version.
    #[must_use]
    pub fn select_list(self) -> String {
        let column = |present: bool, name: &str| {
            if present {
                name.to_owned()
            } else {
                format!("NULL::text AS {name}")
            }
        };
        [
            column(self.log_schema_suffix, "grpdef_log_schema_suffix"),
            column(self.names_prefix, "grpdef_emaj_names_prefix"),
            column(self.tablespaces, "grpdef_log_dat_tsp"),
            column(self.tablespaces, "grpdef_log_idx_tsp"),
        ]
        .join(", ")
    }
}

/// Every version-sensitive rendering decision for one version band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectRules {
    /// Logging state encoding.
    pub logging_state: LoggingState,
    /// Mark deletion state encoding.
    pub mark_state: MarkState,
    /// Log table location.
    pub log_location: LogLocation,
    /// Rollback estimator shape.
    pub estimator: Estimator,
    /// Optional group definition columns.
    pub definition: DefinitionColumns,
}

const LEGACY_RULES: DialectRules = DialectRules {
    logging_state: LoggingState::TextState,
    mark_state: MarkState::TextState,
    log_location: LogLocation::FixedSchema,
    estimator: Estimator::TwoArguments,
    definition: DefinitionColumns {
        log_schema_suffix: false,
        names_prefix: false,
        tablespaces: false,
    },
};

/// Decision table, newest band first. A version uses the first row whose
/// threshold it reaches; unknown versions (numeric `0`) fall through to the
/// oldest dialect.
const DECISION_TABLE: [(u32, DialectRules); 4] = [
    (
        VERSION_1_2_0,
        DialectRules {
            logging_state: LoggingState::Flag,
            mark_state: MarkState::Flag,
            log_location: LogLocation::PerRelationTable,
            estimator: Estimator::ThreeArguments,
            definition: DefinitionColumns {
                log_schema_suffix: true,
                names_prefix: true,
                tablespaces: true,
            },
        },
    ),
    (
        VERSION_1_1_0,
        DialectRules {
            logging_state: LoggingState::Flag,
            mark_state: MarkState::Flag,
            log_location: LogLocation::PerRelationSchema,
            estimator: Estimator::ThreeArguments,
            definition: DefinitionColumns {
                log_schema_suffix: true,
                names_prefix: false,
                tablespaces: true,
            },
        },
    ),
    (
        VERSION_1_0_0,
        DialectRules {
            logging_state: LoggingState::TextState,
            mark_state: MarkState::TextState,
            log_location: LogLocation::PerRelationSchema,
            estimator: Estimator::TwoArguments,
            definition: DefinitionColumns {
                log_schema_suffix: true,
                names_prefix: false,
                tablespaces: true,
            },
        },
    ),
    (0, LEGACY_RULES),
];

impl DialectRules {
    /// Looks up the rules for a numeric extension version.
    #[must_use]
    pub fn for_version(numeric: u32) -> Self {
        DECISION_TABLE
            .iter()
            .find(|(threshold, _)| numeric >= *threshold)
            .map_or(LEGACY_RULES, |(_, rules)| *rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, LoggingState::TextState, LogLocation::FixedSchema)]
    #[case(1_100, LoggingState::TextState, LogLocation::FixedSchema)]
    #[case(10_005, LoggingState::TextState, LogLocation::PerRelationSchema)]
    #[case(10_099, LoggingState::TextState, LogLocation::PerRelationSchema)]
    #[case(10_100, LoggingState::Flag, LogLocation::PerRelationSchema)]
    #[case(10_200, LoggingState::Flag, LogLocation::PerRelationTable)]
    #[case(40_500, LoggingState::Flag, LogLocation::PerRelationTable)]
    fn thresholds_select_expected_band(
        #[case] numeric: u32,
        #[case] logging: LoggingState,
        #[case] location: LogLocation,
    ) {
        let rules = DialectRules::for_version(numeric);
        assert_eq!(rules.logging_state, logging);
        assert_eq!(rules.log_location, location);
    }

    #[test]
    fn estimator_arity_switches_at_1_1_0() {
        assert_eq!(
            DialectRules::for_version(VERSION_1_1_0 - 1).estimator,
            Estimator::TwoArguments
        );
        assert_eq!(
            DialectRules::for_version(VERSION_1_1_0).estimator,
            Estimator::ThreeArguments
        );
    }

    #[test]
    fn state_encodings_normalise_to_booleans() {
        assert_eq!(
            LoggingState::TextState.is_logging_column(),
            "(group_state = 'LOGGING')"
        );
        assert_eq!(MarkState::Flag.is_deleted_column(), "mark_is_deleted");
        assert_eq!(
            MarkState::TextState.active_predicate(),
            "mark_state = 'ACTIVE'"
        );
    }

    #[test]
    fn fixed_schema_log_tables_quote_the_extension_schema() {
        let expr = LogLocation::FixedSchema.log_table_expr("emaj");
        assert!(expr.starts_with("quote_ident('emaj')"));
        assert!(!LogLocation::FixedSchema.has_log_schema());
    }

    #[test]
    fn missing_definition_columns_render_as_nulls() {
        let list = LEGACY_RULES.definition.select_list();
        assert!(list.contains("NULL::text AS grpdef_log_schema_suffix"));
        assert!(list.contains("NULL::text AS grpdef_log_idx_tsp"));
    }
}
