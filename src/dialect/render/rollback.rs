//! Rollback execution and monitoring statements.

use super::push_group_call;
use crate::dialect::{Dialect, RollbackCommand, Statement};

const FINISHED_STATUSES: &str = "('COMPLETED', 'COMMITTED', 'ABORTED')";

fn completed(dialect: &Dialect, limit: Option<i64>, retention_hours: Option<i32>) -> Statement {
    let mut builder = Statement::builder(&format!(
        "SELECT rlbk_id, rlbk_groups, rlbk_status::text AS rlbk_status, \
         rlbk_start_datetime, rlbk_end_datetime, \
         to_char(rlbk_end_datetime - rlbk_start_datetime, 'HH24:MI:SS') AS rlbk_duration, \
         rlbk_mark, rlbk_mark_datetime, rlbk_is_logged, rlbk_nb_session, rlbk_eff_nb_table, \
         rlbk_nb_sequence \
         FROM {}.emaj_rlbk WHERE rlbk_status::text IN {FINISHED_STATUSES}",
        dialect.quoted_schema()
    ));
    if let Some(hours) = retention_hours.filter(|hours| *hours > 0) {
        builder
            .push_bind(" AND rlbk_end_datetime > current_timestamp - ", hours)
            .push(" * interval '1 hour'");
    }
    builder.push(" ORDER BY rlbk_id DESC");
    if let Some(count) = limit.filter(|count| *count > 0) {
        builder.push_bind(" LIMIT ", count);
    }
    builder.build()
}

pub(in crate::dialect) fn render(dialect: &Dialect, operation: &RollbackCommand) -> Statement {
    let schema = dialect.quoted_schema();
    match operation {
        RollbackCommand::Execute {
            groups,
            mark,
            is_logged,
        } => {
            let (single, multi) = if *is_logged {
                ("emaj_logged_rollback_group", "emaj_logged_rollback_groups")
            } else {
                ("emaj_rollback_group", "emaj_rollback_groups")
            };
            let mut builder = Statement::builder("SELECT ");
            push_group_call(&mut builder, schema, single, multi, groups);
            builder.push_bind(", ", mark.as_str()).push(") AS nbtblseq");
            builder.build()
        }
        RollbackCommand::InitAsync {
            groups,
            mark,
            is_logged,
        } => {
            let mut builder = Statement::builder("SELECT ");
            builder
                .push(schema)
                .push_bind("._rlbk_init(", groups.to_names())
                .push("::text[]")
                .push_bind(", ", mark.as_str())
                .push_bind(", ", *is_logged)
                .push(", 1, false) AS rlbk_id");
            builder.build()
        }
        // Runs in an external client without bind support, so the identifier
        // is inlined; it is an integer issued by the server.
        RollbackCommand::ExecuteAsync { id } => {
            Statement::raw(format!("SELECT {schema}._rlbk_async({id}, false)"))
        }
        RollbackCommand::Activity { id } => {
            let mut builder = Statement::builder(&format!(
                "SELECT rlbk_id, rlbk_groups, rlbk_mark, rlbk_mark_datetime, rlbk_is_logged, \
                 rlbk_nb_session, rlbk_nb_table, rlbk_nb_sequence, rlbk_eff_nb_table, \
                 rlbk_status::text AS rlbk_status, rlbk_start_datetime, \
                 to_char(rlbk_elapse, 'HH24:MI:SS') AS rlbk_elapse, \
                 rlbk_remaining::text AS rlbk_remaining, rlbk_completion_pct \
                 FROM {schema}.emaj_rollback_activity()"
            ));
            if let Some(rollback_id) = id {
                builder.push_bind(" WHERE rlbk_id = ", rollback_id.value());
            }
            builder.push(" ORDER BY rlbk_id DESC");
            builder.build()
        }
        RollbackCommand::CleanupState => Statement::raw(format!(
            "SELECT {schema}.emaj_cleanup_rollback_state() AS nb_cleaned"
        )),
        RollbackCommand::Completed {
            limit,
            retention_hours,
        } => completed(dialect, *limit, *retention_hours),
    }
}
