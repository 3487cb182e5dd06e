//! Mark read models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named checkpoint in the log of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    /// Owning group.
    pub group: String,
    /// Mark name.
    pub name: String,
    /// Time the mark was set.
    pub created_at: DateTime<Utc>,
    /// Optional mark comment.
    pub comment: Option<String>,
    /// Whether the mark can still be used as a rollback target.
    pub is_active: bool,
    /// Log rows recorded between this mark and the next one.
    pub log_rows: i64,
    /// Log rows recorded since this mark, i.e. the volume a rollback to this
    /// mark would revert.
    pub cumulative_log_rows: i64,
}

/// Fills `cumulative_log_rows` for marks ordered newest first.
pub fn accumulate_log_rows(marks: &mut [Mark]) {
    let mut running_total: i64 = 0;
    for mark in marks.iter_mut() {
        running_total = running_total.saturating_add(mark.log_rows);
        mark.cumulative_log_rows = running_total;
    }
}

/// A mark usable as a rollback target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackTargetMark {
    /// Mark name.
    pub name: String,
    /// Time the mark was set.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(name: &str, log_rows: i64) -> Mark {
        Mark {
            group: "g".to_owned(),
            name: name.to_owned(),
            created_at: Utc::now(),
            comment: None,
            is_active: true,
            log_rows,
            cumulative_log_rows: 0,
        }
    }

    #[test]
    fn cumulative_rows_grow_towards_older_marks() {
        let mut marks = vec![mark("m3", 5), mark("m2", 10), mark("m1", 0)];
        accumulate_log_rows(&mut marks);
        let totals: Vec<i64> = marks.iter().map(|m| m.cumulative_log_rows).collect();
        assert_eq!(totals, vec![5, 15, 15]);
    }
}
