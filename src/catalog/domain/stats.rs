//! Log statistics between two marks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Rows logged for one table between two marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStatEntry {
    /// Group name.
    pub group: String,
    /// Application schema.
    pub schema: String,
    /// Application table.
    pub table: String,
    /// Number of log rows.
    pub rows: i64,
    /// Query selecting the matching log rows.
    pub sql_text: String,
}

/// Rows logged for one table, role and verb between two marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedLogStatEntry {
    /// Group name.
    pub group: String,
    /// Application schema.
    pub schema: String,
    /// Application table.
    pub table: String,
    /// Role that performed the changes.
    pub role: String,
    /// SQL verb (`INSERT`, `UPDATE`, `DELETE`, `TRUNCATE`).
    pub verb: String,
    /// Number of log rows.
    pub rows: i64,
    /// Query selecting the matching log rows.
    pub sql_text: String,
}

/// Aggregates over a [`LogStatEntry`] list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStatSummary {
    /// Total number of log rows.
    pub total_rows: i64,
    /// Number of distinct tables with changes.
    pub table_count: usize,
}

impl LogStatSummary {
    /// Computes the summary of `entries`.
    #[must_use]
    pub fn from_entries(entries: &[LogStatEntry]) -> Self {
        let tables: BTreeSet<(&str, &str)> = entries
            .iter()
            .map(|entry| (entry.schema.as_str(), entry.table.as_str()))
            .collect();
        Self {
            total_rows: entries.iter().map(|entry| entry.rows).sum(),
            table_count: tables.len(),
        }
    }
}

/// Aggregates over a [`DetailedLogStatEntry`] list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedLogStatSummary {
    /// Total number of log rows.
    pub total_rows: i64,
    /// Number of distinct tables with changes.
    pub table_count: usize,
    /// Rows logged by `INSERT`.
    pub inserts: i64,
    /// Rows logged by `UPDATE`.
    pub updates: i64,
    /// Rows logged by `DELETE`.
    pub deletes: i64,
    /// Rows logged by `TRUNCATE`.
    pub truncates: i64,
    /// Distinct roles, sorted.
    pub roles: Vec<String>,
}

impl DetailedLogStatSummary {
    /// Computes the summary of `entries`.
    #[must_use]
    pub fn from_entries(entries: &[DetailedLogStatEntry]) -> Self {
        let verb_rows = |verb: &str| -> i64 {
            entries
                .iter()
                .filter(|entry| entry.verb.eq_ignore_ascii_case(verb))
                .map(|entry| entry.rows)
                .sum()
        };
        let tables: BTreeSet<(&str, &str)> = entries
            .iter()
            .map(|entry| (entry.schema.as_str(), entry.table.as_str()))
            .collect();
        let roles: BTreeSet<&str> = entries.iter().map(|entry| entry.role.as_str()).collect();
        Self {
            total_rows: entries.iter().map(|entry| entry.rows).sum(),
            table_count: tables.len(),
            inserts: verb_rows("INSERT"),
            updates: verb_rows("UPDATE"),
            deletes: verb_rows("DELETE"),
            truncates: verb_rows("TRUNCATE"),
            roles: roles.into_iter().map(str::to_owned).collect(),
        }
    }
}

/// Global log statistics with their summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStatReport {
    /// Per-table statistics.
    pub entries: Vec<LogStatEntry>,
    /// Aggregates.
    pub summary: LogStatSummary,
}

/// Detailed log statistics with their summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedLogStatReport {
    /// Per-table, role and verb statistics.
    pub entries: Vec<DetailedLogStatEntry>,
    /// Aggregates.
    pub summary: DetailedLogStatSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detailed(table: &str, role: &str, verb: &str, rows: i64) -> DetailedLogStatEntry {
        DetailedLogStatEntry {
            group: "g".to_owned(),
            schema: "app".to_owned(),
            table: table.to_owned(),
            role: role.to_owned(),
            verb: verb.to_owned(),
            rows,
            sql_text: String::new(),
        }
    }

    #[test]
    fn detailed_summary_splits_rows_per_verb() {
        let entries = vec![
            detailed("t1", "alice", "INSERT", 4),
            detailed("t1", "bob", "UPDATE", 2),
            detailed("t2", "alice", "DELETE", 1),
            detailed("t2", "alice", "INSERT", 3),
        ];

        let summary = DetailedLogStatSummary::from_entries(&entries);

        assert_eq!(summary.total_rows, 10);
        assert_eq!(summary.table_count, 2);
        assert_eq!(summary.inserts, 7);
        assert_eq!(summary.updates, 2);
        assert_eq!(summary.deletes, 1);
        assert_eq!(summary.truncates, 0);
        assert_eq!(summary.roles, vec!["alice".to_owned(), "bob".to_owned()]);
    }

    #[test]
    fn empty_statistics_summarise_to_zero() {
        assert_eq!(LogStatSummary::from_entries(&[]), LogStatSummary::default());
    }
}
