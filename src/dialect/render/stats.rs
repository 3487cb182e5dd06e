//! Log statistics and rollback estimate statements.

use crate::catalog::domain::{GroupName, MarkName};
use crate::dialect::{Dialect, Statement, StatOperation};

/// Shape of a log statistics query.
#[derive(Clone, Copy)]
enum StatDetail {
    PerTable,
    PerRoleAndVerb,
}

impl StatDetail {
    const fn function(self) -> &'static str {
        match self {
            Self::PerTable => "emaj_log_stat_group",
            Self::PerRoleAndVerb => "emaj_detailed_log_stat_group",
        }
    }

    const fn columns(self) -> &'static str {
        match self {
            Self::PerTable => "stat_group, stat_schema, stat_table, stat_rows",
            Self::PerRoleAndVerb => {
                "stat_group, stat_schema, stat_table, stat_role, stat_verb, stat_rows"
            }
        }
    }

    const fn verb_filter(self) -> &'static str {
        match self {
            Self::PerTable => "",
            Self::PerRoleAndVerb => {
                " || ' and emaj_verb = ' || quote_literal(substring(stat_verb from 1 for 3))"
            }
        }
    }

    const fn ordering(self) -> &'static str {
        match self {
            Self::PerTable => " ORDER BY stat_group, stat_schema, stat_table",
            Self::PerRoleAndVerb => {
                " ORDER BY stat_group, stat_schema, stat_table, stat_role, stat_verb"
            }
        }
    }
}

/// Statistics rows with the query selecting the matching log rows.
fn log_stat(
    dialect: &Dialect,
    detail: StatDetail,
    group: &GroupName,
    first_mark: &MarkName,
    last_mark: Option<&MarkName>,
) -> Statement {
    let schema = dialect.quoted_schema();
    let log_table = dialect.rules().log_location.log_table_expr(dialect.schema());
    let upper_bound = if last_mark.is_some() {
        " || ' and emaj_gid <= ' || stopmark.mark_global_seq"
    } else {
        ""
    };
    let mut builder = Statement::builder(&format!(
        "SELECT {columns}, \
         'select * from ' || {log_table} || ' where emaj_gid > ' || strtmark.mark_global_seq\
         {upper_bound}{verb_filter} || ' order by emaj_gid' AS sql_text \
         FROM {schema}.{function}(",
        columns = detail.columns(),
        verb_filter = detail.verb_filter(),
        function = detail.function(),
    ));
    builder
        .bind(group.as_str())
        .push_bind(", ", first_mark.as_str())
        .push(", ");
    if let Some(mark) = last_mark {
        builder.bind(mark.as_str());
    } else {
        builder.push("NULL");
    }
    builder.push(&format!(
        "), {schema}.emaj_mark strtmark, {schema}.emaj_relation"
    ));
    if last_mark.is_some() {
        builder.push(&format!(", {schema}.emaj_mark stopmark"));
    }
    builder
        .push_bind(
            " WHERE stat_rows > 0 AND rel_schema = stat_schema AND rel_tblseq = stat_table \
             AND strtmark.mark_group = ",
            group.as_str(),
        )
        .push_bind(" AND strtmark.mark_name = ", first_mark.as_str());
    if let Some(mark) = last_mark {
        builder
            .push_bind(" AND stopmark.mark_group = ", group.as_str())
            .push_bind(" AND stopmark.mark_name = ", mark.as_str());
    }
    builder.push(detail.ordering());
    builder.build()
}

pub(in crate::dialect) fn render(dialect: &Dialect, operation: &StatOperation) -> Statement {
    let schema = dialect.quoted_schema();
    match operation {
        StatOperation::Log {
            group,
            first_mark,
            last_mark,
        } => log_stat(
            dialect,
            StatDetail::PerTable,
            group,
            first_mark,
            last_mark.as_ref(),
        ),
        StatOperation::DetailedLog {
            group,
            first_mark,
            last_mark,
        } => log_stat(
            dialect,
            StatDetail::PerRoleAndVerb,
            group,
            first_mark,
            last_mark.as_ref(),
        ),
        StatOperation::GlobalRollback { group, mark } => {
            let mut builder = Statement::builder(&format!(
                "SELECT coalesce(sum(stat_rows), 0)::bigint AS sum_rows, count(*) AS nb_tables \
                 FROM {schema}.emaj_log_stat_group("
            ));
            builder
                .bind(group.as_str())
                .push_bind(", ", mark.as_str())
                .push(", NULL) WHERE stat_rows > 0");
            builder.build()
        }
        StatOperation::EstimateRollback { group, mark } => {
            let mut builder = Statement::builder("SELECT to_char(");
            dialect
                .rules()
                .estimator
                .push_call(&mut builder, schema, group.as_str(), mark.as_str());
            builder.push(" + '1 second'::interval, 'HH24:MI:SS') AS duration");
            builder.build()
        }
    }
}
