//! Row decoding for rollback monitoring results.

use crate::database::ports::{ExecutorError, ExecutorResult, Row};
use crate::rollback::domain::{RollbackId, RollbackOperation, RollbackProgress, RollbackStatus};

fn rollback_id(row: &Row) -> ExecutorResult<RollbackId> {
    let raw = row.int("rlbk_id")?;
    RollbackId::new(raw).map_err(|err| ExecutorError::decode("rlbk_id", err.to_string()))
}

fn status(row: &Row) -> ExecutorResult<RollbackStatus> {
    let raw = row.text("rlbk_status")?;
    RollbackStatus::try_from(raw.as_str())
        .map_err(|err| ExecutorError::decode("rlbk_status", err.to_string()))
}

pub(super) fn progress(row: &Row) -> ExecutorResult<RollbackProgress> {
    Ok(RollbackProgress {
        id: rollback_id(row)?,
        groups: row.text_list("rlbk_groups")?,
        target_mark: row.text("rlbk_mark")?,
        is_logged: row.flag("rlbk_is_logged")?,
        status: status(row)?,
        session_count: row.opt_int("rlbk_nb_session")?.unwrap_or(0),
        table_count: row.opt_int("rlbk_nb_table")?.unwrap_or(0),
        sequence_count: row.opt_int("rlbk_nb_sequence")?.unwrap_or(0),
        started_at: row.opt_timestamp("rlbk_start_datetime")?,
        elapsed: row.opt_text("rlbk_elapse")?,
        remaining: row.opt_text("rlbk_remaining")?,
        completion_pct: row.opt_int("rlbk_completion_pct")?,
    })
}

pub(super) fn operation(row: &Row) -> ExecutorResult<RollbackOperation> {
    Ok(RollbackOperation {
        id: rollback_id(row)?,
        groups: row.text_list("rlbk_groups")?,
        target_mark: row.text("rlbk_mark")?,
        mark_datetime: row.opt_timestamp("rlbk_mark_datetime")?,
        is_logged: row.flag("rlbk_is_logged")?,
        status: status(row)?,
        started_at: row.opt_timestamp("rlbk_start_datetime")?,
        ended_at: row.opt_timestamp("rlbk_end_datetime")?,
        duration: row.opt_text("rlbk_duration")?,
        session_count: row.opt_int("rlbk_nb_session")?.unwrap_or(0),
        table_count: row.opt_int("rlbk_eff_nb_table")?.unwrap_or(0),
        sequence_count: row.opt_int("rlbk_nb_sequence")?.unwrap_or(0),
    })
}

pub(super) fn all<T>(rows: &[Row], decode: fn(&Row) -> ExecutorResult<T>) -> ExecutorResult<Vec<T>> {
    rows.iter().map(decode).collect()
}
