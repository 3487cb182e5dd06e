//! Row decoding for catalog results.
//!
//! Column names are the aliases chosen by the dialect translator, which keeps
//! them stable across extension versions.

use crate::catalog::domain::{
    DetailedLogStatEntry, GroupRelation, GroupState, GroupSummary, LogStatEntry, Mark,
    RelationKind, RollbackTargetMark, SchemaEntry, TableGroup, TableSequenceEntry,
};
use crate::database::ports::{ExecutorError, ExecutorResult, Row};

fn relation_kind(row: &Row, column: &str) -> ExecutorResult<RelationKind> {
    let code = row.text(column)?;
    RelationKind::try_from(code.as_str())
        .map_err(|err| ExecutorError::decode(column, err.to_string()))
}

pub(super) fn group_summary(row: &Row) -> ExecutorResult<GroupSummary> {
    Ok(GroupSummary {
        name: row.text("group_name")?,
        comment: row.opt_text("group_comment")?,
    })
}

pub(super) fn group_name(row: &Row) -> ExecutorResult<String> {
    row.text("group_name")
}

pub(super) fn table_group(row: &Row) -> ExecutorResult<TableGroup> {
    Ok(TableGroup {
        name: row.text("group_name")?,
        is_rollbackable: row.flag("group_is_rollbackable")?,
        is_logging: row.flag("group_is_logging")?,
        table_count: row.int("group_nb_table")?,
        sequence_count: row.int("group_nb_sequence")?,
        comment: row.opt_text("group_comment")?,
        created_at: row.timestamp("group_creation_datetime")?,
        mark_count: row.int("nb_mark")?,
    })
}

pub(super) fn group_state(row: &Row) -> ExecutorResult<GroupState> {
    Ok(GroupState {
        name: row.text("group_name")?,
        is_rollbackable: row.flag("group_is_rollbackable")?,
        is_logging: row.flag("group_is_logging")?,
    })
}

pub(super) fn group_relation(row: &Row) -> ExecutorResult<GroupRelation> {
    Ok(GroupRelation {
        schema: row.text("rel_schema")?,
        name: row.text("rel_tblseq")?,
        kind: relation_kind(row, "rel_kind")?,
        priority: row.opt_int("rel_priority")?,
        log_schema: row.opt_text("rel_log_schema")?,
        log_data_tablespace: row.opt_text("rel_log_dat_tsp")?,
        log_index_tablespace: row.opt_text("rel_log_idx_tsp")?,
        names_prefix: row.opt_text("emaj_names_prefix")?,
        log_size_bytes: row.opt_int("byte_log_size")?,
        log_size_pretty: row.opt_text("pretty_log_size")?,
    })
}

pub(super) fn mark(row: &Row) -> ExecutorResult<Mark> {
    Ok(Mark {
        group: row.text("mark_group")?,
        name: row.text("mark_name")?,
        created_at: row.timestamp("mark_datetime")?,
        comment: row.opt_text("mark_comment")?,
        is_active: !row.flag("mark_is_deleted")?,
        log_rows: row.int("mark_log_rows")?,
        cumulative_log_rows: 0,
    })
}

pub(super) fn rollback_target(row: &Row) -> ExecutorResult<RollbackTargetMark> {
    Ok(RollbackTargetMark {
        name: row.text("mark_name")?,
        created_at: row.timestamp("mark_datetime")?,
    })
}

pub(super) fn schema_entry(row: &Row) -> ExecutorResult<SchemaEntry> {
    Ok(SchemaEntry {
        name: row.text("nspname")?,
        owner: row.opt_text("nspowner")?,
        comment: row.opt_text("nspcomment")?,
        exists: row.int("sort_key")? == 1,
    })
}

pub(super) fn table_sequence_entry(row: &Row) -> ExecutorResult<TableSequenceEntry> {
    Ok(TableSequenceEntry {
        schema: row.text("nspname")?,
        name: row.text("relname")?,
        kind: relation_kind(row, "relkind")?,
        owner: row.opt_text("relowner")?,
        comment: row.opt_text("relcomment")?,
        tablespace: row.opt_text("tablespace")?,
        group: row.opt_text("grpdef_group")?,
        priority: row.opt_int("grpdef_priority")?,
        log_schema_suffix: row.opt_text("grpdef_log_schema_suffix")?,
        names_prefix: row.opt_text("grpdef_emaj_names_prefix")?,
        log_data_tablespace: row.opt_text("grpdef_log_dat_tsp")?,
        log_index_tablespace: row.opt_text("grpdef_log_idx_tsp")?,
    })
}

pub(super) fn log_stat(row: &Row) -> ExecutorResult<LogStatEntry> {
    Ok(LogStatEntry {
        group: row.text("stat_group")?,
        schema: row.text("stat_schema")?,
        table: row.text("stat_table")?,
        rows: row.int("stat_rows")?,
        sql_text: row.text("sql_text")?,
    })
}

pub(super) fn detailed_log_stat(row: &Row) -> ExecutorResult<DetailedLogStatEntry> {
    Ok(DetailedLogStatEntry {
        group: row.text("stat_group")?,
        schema: row.text("stat_schema")?,
        table: row.text("stat_table")?,
        role: row.text("stat_role")?,
        verb: row.text("stat_verb")?,
        rows: row.int("stat_rows")?,
        sql_text: row.text("sql_text")?,
    })
}

/// Decodes every row with `decode`.
pub(super) fn all<T>(rows: &[Row], decode: fn(&Row) -> ExecutorResult<T>) -> ExecutorResult<Vec<T>> {
    rows.iter().map(decode).collect()
}
