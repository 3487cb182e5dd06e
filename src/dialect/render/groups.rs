//! Table group statements.

use super::push_group_call;
use crate::dialect::{Dialect, GroupOperation, Statement};

/// Select list shared by every group listing, with the logging state
/// normalised to the boolean `group_is_logging`.
fn group_select(dialect: &Dialect, extra_columns: &str) -> String {
    let schema = dialect.quoted_schema();
    format!(
        "SELECT group_name, group_nb_table, group_nb_sequence, group_is_rollbackable, \
         {logging} AS group_is_logging, group_comment, group_creation_datetime, \
         (SELECT count(*) FROM {schema}.emaj_mark \
         WHERE mark_group = emaj_group.group_name) AS nb_mark{extra_columns} \
         FROM {schema}.emaj_group",
        logging = dialect.rules().logging_state.is_logging_column(),
    )
}

fn list_by_state(dialect: &Dialect, logging: bool) -> Statement {
    let predicate = dialect.rules().logging_state.predicate(logging);
    Statement::raw(format!(
        "{} WHERE {predicate} ORDER BY group_name",
        group_select(dialect, "")
    ))
}

fn get_group(dialect: &Dialect, group: &str) -> Statement {
    let schema = dialect.quoted_schema();
    let log_table = dialect.rules().log_location.log_table_expr(dialect.schema());
    let log_size = format!(
        ", pg_size_pretty((SELECT sum(pg_total_relation_size(({log_table})::regclass)) \
         FROM {schema}.emaj_relation \
         WHERE rel_group = group_name AND rel_kind = 'r')::bigint) AS log_size"
    );
    let mut builder = Statement::builder(&group_select(dialect, &log_size));
    builder.push_bind(" WHERE group_name = ", group);
    builder.build()
}

fn group_content(dialect: &Dialect, group: &str) -> Statement {
    let rules = dialect.rules();
    let log_table = rules.log_location.log_table_expr(dialect.schema());
    let mut builder = Statement::builder(&format!(
        "SELECT rel_schema, rel_tblseq, rel_kind::text AS rel_kind, rel_priority, {attributes}, \
         CASE WHEN rel_kind = 'r' THEN pg_total_relation_size(({log_table})::regclass) END \
         AS byte_log_size, \
         CASE WHEN rel_kind = 'r' THEN pg_size_pretty(pg_total_relation_size(({log_table})::regclass)) END \
         AS pretty_log_size \
         FROM {schema}.emaj_relation WHERE rel_group = ",
        attributes = rules.log_location.relation_attributes(),
        schema = dialect.quoted_schema(),
    ));
    builder.bind(group).push(" ORDER BY rel_schema, rel_tblseq");
    builder.build()
}

/// Size of every relation holding log data, pretty-printed with its share of
/// the database size.
fn extension_size(dialect: &Dialect) -> Statement {
    let schema = dialect.quoted_schema();
    let mut builder = Statement::builder(
        "SELECT coalesce(pg_size_pretty(t.total_size) \
         || to_char(t.total_size * 100 / pg_database_size(current_database())::float, ' = FM990D0%'), \
         '0 B = 0%') AS emaj_size \
         FROM (SELECT sum(pg_total_relation_size(c.oid))::bigint AS total_size \
         FROM pg_catalog.pg_class c \
         JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
         WHERE c.relkind = 'r' AND ",
    );
    if dialect.rules().log_location.has_log_schema() {
        builder.push(&format!(
            "n.nspname IN (SELECT DISTINCT rel_log_schema FROM {schema}.emaj_relation)"
        ));
    } else {
        builder.push_bind("n.nspname = ", dialect.schema());
    }
    builder.push(") AS t");
    builder.build()
}

fn single_group_function(dialect: &Dialect, function: &str, group: &str) -> Statement {
    let mut builder = Statement::builder("SELECT ");
    builder
        .push(dialect.quoted_schema())
        .push(".")
        .push(function)
        .push_bind("(", group)
        .push(") AS nbtblseq");
    builder.build()
}

pub(in crate::dialect) fn render(dialect: &Dialect, operation: &GroupOperation) -> Statement {
    let schema = dialect.quoted_schema();
    match operation {
        GroupOperation::List => Statement::raw(format!(
            "SELECT group_name, group_comment FROM {schema}.emaj_group ORDER BY group_name"
        )),
        GroupOperation::ListIdle => list_by_state(dialect, false),
        GroupOperation::ListLogging => list_by_state(dialect, true),
        GroupOperation::ListNew => Statement::raw(format!(
            "SELECT DISTINCT grpdef_group AS group_name FROM {schema}.emaj_group_def \
             EXCEPT SELECT group_name FROM {schema}.emaj_group ORDER BY 1"
        )),
        GroupOperation::Get { group } => get_group(dialect, group.as_str()),
        GroupOperation::States { groups } => {
            let mut builder = Statement::builder(&format!(
                "SELECT group_name, group_is_rollbackable, {logging} AS group_is_logging \
                 FROM {schema}.emaj_group WHERE group_name = ANY(",
                logging = dialect.rules().logging_state.is_logging_column(),
            ));
            builder
                .bind(groups.to_names())
                .push("::text[]) ORDER BY group_name");
            builder.build()
        }
        GroupOperation::IsRollbackable { group } => {
            let mut builder = Statement::builder(&format!(
                "SELECT group_is_rollbackable AS is_rollbackable FROM {schema}.emaj_group \
                 WHERE group_name = "
            ));
            builder.bind(group.as_str());
            builder.build()
        }
        GroupOperation::Content { group } => group_content(dialect, group.as_str()),
        GroupOperation::Create {
            group,
            is_rollbackable,
        } => {
            let mut builder = Statement::builder("SELECT ");
            builder
                .push(schema)
                .push_bind(".emaj_create_group(", group.as_str())
                .push_bind(", ", *is_rollbackable)
                .push(") AS nbtblseq");
            builder.build()
        }
        GroupOperation::Drop { group } => {
            single_group_function(dialect, "emaj_drop_group", group.as_str())
        }
        GroupOperation::Alter { group } => {
            single_group_function(dialect, "emaj_alter_group", group.as_str())
        }
        GroupOperation::Comment { group, comment } => {
            let mut builder = Statement::builder("SELECT ");
            builder
                .push(schema)
                .push_bind(".emaj_comment_group(", group.as_str())
                .push_bind(", ", comment.clone())
                .push(")");
            builder.build()
        }
        GroupOperation::Start {
            groups,
            mark,
            reset_log,
        } => {
            let mut builder = Statement::builder("SELECT ");
            push_group_call(
                &mut builder,
                schema,
                "emaj_start_group",
                "emaj_start_groups",
                groups,
            );
            builder.push_bind(", ", mark.as_str());
            if !*reset_log {
                builder.push(", false");
            }
            builder.push(") AS nbtblseq");
            builder.build()
        }
        GroupOperation::Stop { groups, mark } => {
            let mut builder = Statement::builder("SELECT ");
            push_group_call(
                &mut builder,
                schema,
                "emaj_stop_group",
                "emaj_stop_groups",
                groups,
            );
            if let Some(final_mark) = mark {
                builder.push_bind(", ", final_mark.as_str());
            }
            builder.push(") AS nbtblseq");
            builder.build()
        }
        GroupOperation::ForceStop { group } => {
            single_group_function(dialect, "emaj_force_stop_group", group.as_str())
        }
        GroupOperation::Reset { group } => {
            single_group_function(dialect, "emaj_reset_group", group.as_str())
        }
        GroupOperation::ExtensionSize => extension_size(dialect),
        GroupOperation::VerifyAll => Statement::raw(format!(
            "SELECT message::text AS message FROM {schema}.emaj_verify_all() AS message"
        )),
    }
}
