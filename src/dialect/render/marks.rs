//! Mark statements.

use super::push_group_call;
use crate::catalog::domain::GroupSelection;
use crate::dialect::{Dialect, MarkOperation, Statement};

fn mark_select(dialect: &Dialect) -> String {
    let schema = dialect.quoted_schema();
    format!(
        "SELECT mark_group, mark_name, mark_datetime, mark_comment, \
         {deleted} AS mark_is_deleted, \
         coalesce(mark_log_rows_before_next, \
         (SELECT sum(stat_rows) FROM {schema}.emaj_log_stat_group(emaj_mark.mark_group, emaj_mark.mark_name, NULL)), \
         0)::bigint AS mark_log_rows \
         FROM {schema}.emaj_mark WHERE mark_group = ",
        deleted = dialect.rules().mark_state.is_deleted_column(),
    )
}

fn rollback_targets(dialect: &Dialect, groups: &GroupSelection) -> Statement {
    let schema = dialect.quoted_schema();
    let active = dialect.rules().mark_state.active_predicate();
    if let Some(group) = groups.as_single() {
        let mut builder = Statement::builder(&format!(
            "SELECT mark_name, mark_datetime FROM {schema}.emaj_mark \
             WHERE {active} AND mark_group = "
        ));
        builder
            .bind(group.as_str())
            .push(" ORDER BY mark_datetime DESC");
        return builder.build();
    }
    let mut builder = Statement::builder(&format!(
        "SELECT t.mark_name, t.mark_datetime \
         FROM (SELECT mark_name, mark_datetime, array_agg(mark_group::text) AS groups \
         FROM {schema}.emaj_mark, {schema}.emaj_group \
         WHERE mark_group = group_name AND {active} AND group_is_rollbackable \
         GROUP BY 1, 2) AS t \
         WHERE t.groups @> "
    ));
    builder
        .bind(groups.to_names())
        .push("::text[] ORDER BY t.mark_datetime DESC");
    builder.build()
}

fn group_mark_function(
    dialect: &Dialect,
    function: &str,
    group: &str,
    mark: &str,
    alias: Option<&str>,
) -> Statement {
    let mut builder = Statement::builder("SELECT ");
    builder
        .push(dialect.quoted_schema())
        .push(".")
        .push(function)
        .push_bind("(", group)
        .push_bind(", ", mark)
        .push(")");
    if let Some(column) = alias {
        builder.push(" AS ").push(column);
    }
    builder.build()
}

pub(in crate::dialect) fn render(dialect: &Dialect, operation: &MarkOperation) -> Statement {
    let schema = dialect.quoted_schema();
    let active = dialect.rules().mark_state.active_predicate();
    match operation {
        MarkOperation::List { group } => {
            let mut builder = Statement::builder(&mark_select(dialect));
            builder.bind(group.as_str()).push(" ORDER BY mark_id DESC");
            builder.build()
        }
        MarkOperation::Get { group, mark } => {
            let mut builder = Statement::builder(&mark_select(dialect));
            builder
                .bind(group.as_str())
                .push_bind(" AND mark_name = ", mark.as_str());
            builder.build()
        }
        MarkOperation::CountNamed { groups, mark } => {
            let mut builder = Statement::builder(&format!(
                "SELECT count(*) AS mark_count FROM {schema}.emaj_mark WHERE mark_group = ANY("
            ));
            builder
                .bind(groups.to_names())
                .push("::text[])")
                .push_bind(" AND mark_name = ", mark.as_str());
            builder.build()
        }
        MarkOperation::CountActive { group } => {
            let mut builder = Statement::builder(&format!(
                "SELECT count(*) AS mark_count FROM {schema}.emaj_mark WHERE {active} AND mark_group = "
            ));
            builder.bind(group.as_str());
            builder.build()
        }
        MarkOperation::IsFirst { group, mark } => {
            let mut builder = Statement::builder(&format!(
                "SELECT mark_datetime = (SELECT min(mark_datetime) FROM {schema}.emaj_mark \
                 WHERE mark_group = "
            ));
            builder
                .bind(group.as_str())
                .push(&format!(
                    ") AS is_first FROM {schema}.emaj_mark WHERE mark_group = "
                ))
                .bind(group.as_str())
                .push_bind(" AND mark_name = ", mark.as_str());
            builder.build()
        }
        MarkOperation::Set { groups, mark } => {
            let mut builder = Statement::builder("SELECT ");
            push_group_call(
                &mut builder,
                schema,
                "emaj_set_mark_group",
                "emaj_set_mark_groups",
                groups,
            );
            builder.push_bind(", ", mark.as_str()).push(") AS nbtblseq");
            builder.build()
        }
        MarkOperation::Comment {
            group,
            mark,
            comment,
        } => {
            let mut builder = Statement::builder("SELECT ");
            builder
                .push(schema)
                .push_bind(".emaj_comment_mark_group(", group.as_str())
                .push_bind(", ", mark.as_str())
                .push_bind(", ", comment.clone())
                .push(")");
            builder.build()
        }
        MarkOperation::Delete { group, mark } => group_mark_function(
            dialect,
            "emaj_delete_mark_group",
            group.as_str(),
            mark.as_str(),
            None,
        ),
        MarkOperation::DeleteBefore { group, mark } => group_mark_function(
            dialect,
            "emaj_delete_before_mark_group",
            group.as_str(),
            mark.as_str(),
            Some("nb_mark"),
        ),
        MarkOperation::Rename {
            group,
            mark,
            new_name,
        } => {
            let mut builder = Statement::builder("SELECT ");
            builder
                .push(schema)
                .push_bind(".emaj_rename_mark_group(", group.as_str())
                .push_bind(", ", mark.as_str())
                .push_bind(", ", new_name.as_str())
                .push(")");
            builder.build()
        }
        MarkOperation::RollbackTargets { groups } => rollback_targets(dialect, groups),
        MarkOperation::CountRollbackTargets { groups, mark } => {
            let mut builder = Statement::builder(&format!(
                "SELECT count(*) AS mark_count FROM {schema}.emaj_mark, {schema}.emaj_group \
                 WHERE mark_group = group_name AND group_is_rollbackable AND {active} \
                 AND mark_group = ANY("
            ));
            builder
                .bind(groups.to_names())
                .push("::text[])")
                .push_bind(" AND mark_name = ", mark.as_str());
            builder.build()
        }
    }
}
