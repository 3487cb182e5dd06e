//! Group definition statements.

use crate::catalog::domain::{GroupDefinition, RelationKind};
use crate::dialect::{DefinitionColumns, DefinitionOperation, Dialect, Statement};

fn list_schemas(dialect: &Dialect) -> Statement {
    let schema = dialect.quoted_schema();
    let mut builder = Statement::builder(
        "SELECT 1 AS sort_key, pn.nspname::text AS nspname, pu.rolname::text AS nspowner, \
         pg_catalog.obj_description(pn.oid, 'pg_namespace') AS nspcomment \
         FROM pg_catalog.pg_namespace pn \
         LEFT JOIN pg_catalog.pg_roles pu ON pn.nspowner = pu.oid \
         WHERE pn.nspname NOT LIKE 'pg@_%' ESCAPE '@' \
         AND pn.nspname <> 'information_schema' AND pn.nspname <> ",
    );
    builder.bind(dialect.schema());
    if dialect.rules().log_location.has_log_schema() {
        builder.push(&format!(
            " AND pn.nspname NOT IN (SELECT DISTINCT rel_log_schema FROM {schema}.emaj_relation \
             WHERE rel_log_schema IS NOT NULL)"
        ));
    }
    builder.push(&format!(
        " UNION SELECT DISTINCT 2, grpdef_schema, NULL::text, NULL::text \
         FROM {schema}.emaj_group_def \
         WHERE grpdef_schema NOT IN (SELECT nspname FROM pg_catalog.pg_namespace) \
         ORDER BY 1, 2"
    ));
    builder.build()
}

fn list_tables_sequences(dialect: &Dialect, application_schema: &str) -> Statement {
    let schema = dialect.quoted_schema();
    let optional_columns = dialect.rules().definition.select_list();
    let mut builder = Statement::builder(&format!(
        "SELECT 1 AS sort_key, n.nspname::text AS nspname, c.relname::text AS relname, \
         c.relkind::text AS relkind, pg_catalog.pg_get_userbyid(c.relowner)::text AS relowner, \
         pg_catalog.obj_description(c.oid, 'pg_class') AS relcomment, \
         pt.spcname::text AS tablespace, grpdef_group, grpdef_priority, {optional_columns} \
         FROM pg_catalog.pg_class c \
         LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
         LEFT JOIN {schema}.emaj_group_def ON grpdef_schema = n.nspname AND grpdef_tblseq = c.relname \
         LEFT JOIN pg_catalog.pg_tablespace pt ON pt.oid = c.reltablespace \
         WHERE c.relkind IN ('r', 'S') AND n.nspname = "
    ));
    builder.bind(application_schema);
    builder.push(&format!(
        " UNION SELECT 2, grpdef_schema, grpdef_tblseq, '!', NULL, NULL, NULL, \
         grpdef_group, grpdef_priority, {optional_columns} \
         FROM {schema}.emaj_group_def WHERE grpdef_schema = "
    ));
    builder.bind(application_schema);
    builder.push(
        " AND grpdef_tblseq NOT IN (SELECT c2.relname FROM pg_catalog.pg_class c2 \
         JOIN pg_catalog.pg_namespace n2 ON n2.oid = c2.relnamespace \
         WHERE c2.relkind IN ('r', 'S') AND n2.nspname = ",
    );
    builder.bind(application_schema).push(") ORDER BY 1, 3");
    builder.build()
}

/// Column names written for an assignment, in value order.
fn assigned_columns(columns: DefinitionColumns) -> Vec<&'static str> {
    let mut names = vec!["grpdef_priority"];
    if columns.log_schema_suffix {
        names.push("grpdef_log_schema_suffix");
    }
    if columns.names_prefix {
        names.push("grpdef_emaj_names_prefix");
    }
    if columns.tablespaces {
        names.push("grpdef_log_dat_tsp");
        names.push("grpdef_log_idx_tsp");
    }
    names
}

/// Values matching [`assigned_columns`], with log attributes stored as
/// `NULL` for sequences and blank values.
fn assigned_values(
    columns: DefinitionColumns,
    definition: &GroupDefinition,
    kind: RelationKind,
) -> Vec<Option<String>> {
    let attribute = |value: Option<&String>| GroupDefinition::log_attribute(value, kind);
    let mut values = Vec::new();
    if columns.log_schema_suffix {
        values.push(attribute(definition.log_schema_suffix.as_ref()));
    }
    if columns.names_prefix {
        values.push(attribute(definition.names_prefix.as_ref()));
    }
    if columns.tablespaces {
        values.push(attribute(definition.log_data_tablespace.as_ref()));
        values.push(attribute(definition.log_index_tablespace.as_ref()));
    }
    values
}

fn assign(dialect: &Dialect, definition: &GroupDefinition, kind: RelationKind) -> Statement {
    let columns = dialect.rules().definition;
    let mut builder = Statement::builder(&format!(
        "INSERT INTO {}.emaj_group_def (grpdef_schema, grpdef_tblseq, grpdef_group, {}) VALUES (",
        dialect.quoted_schema(),
        assigned_columns(columns).join(", "),
    ));
    builder
        .bind(definition.key.schema.as_str())
        .push_bind(", ", definition.key.tblseq.as_str())
        .push_bind(", ", definition.key.group.as_str())
        .push_bind(", ", definition.priority);
    for value in assigned_values(columns, definition, kind) {
        builder.push_bind(", ", value);
    }
    builder.push(")");
    builder.build()
}

fn update(dialect: &Dialect, definition: &GroupDefinition, kind: RelationKind) -> Statement {
    let columns = dialect.rules().definition;
    let mut builder = Statement::builder(&format!(
        "UPDATE {}.emaj_group_def SET grpdef_group = ",
        dialect.quoted_schema()
    ));
    builder
        .bind(definition.key.group.as_str())
        .push_bind(", grpdef_priority = ", definition.priority);
    let optional_names = assigned_columns(columns).into_iter().skip(1);
    for (name, value) in optional_names.zip(assigned_values(columns, definition, kind)) {
        builder.push(", ").push(name).push_bind(" = ", value);
    }
    builder
        .push_bind(" WHERE grpdef_schema = ", definition.key.schema.as_str())
        .push_bind(" AND grpdef_tblseq = ", definition.key.tblseq.as_str());
    builder.build()
}

pub(in crate::dialect) fn render(dialect: &Dialect, operation: &DefinitionOperation) -> Statement {
    let schema = dialect.quoted_schema();
    match operation {
        DefinitionOperation::ListSchemas => list_schemas(dialect),
        DefinitionOperation::ListTablesSequences {
            schema: application_schema,
        } => list_tables_sequences(dialect, application_schema),
        DefinitionOperation::KnownGroups => Statement::raw(format!(
            "SELECT DISTINCT grpdef_group AS group_name FROM {schema}.emaj_group_def ORDER BY 1"
        )),
        DefinitionOperation::KnownSuffixes => {
            if dialect.rules().definition.log_schema_suffix {
                Statement::raw(format!(
                    "SELECT DISTINCT grpdef_log_schema_suffix AS known_suffix \
                     FROM {schema}.emaj_group_def \
                     WHERE grpdef_log_schema_suffix <> '' AND grpdef_log_schema_suffix IS NOT NULL \
                     ORDER BY 1"
                ))
            } else {
                Statement::raw("SELECT NULL::text AS known_suffix WHERE false")
            }
        }
        DefinitionOperation::KnownTablespaces => Statement::raw(
            "SELECT spcname::text AS spcname FROM pg_catalog.pg_tablespace \
             WHERE spcname NOT LIKE 'pg\\_%' ORDER BY 1",
        ),
        DefinitionOperation::RelationKind {
            schema: application_schema,
            tblseq,
        } => {
            let mut builder = Statement::builder(
                "SELECT c.relkind::text AS relkind FROM pg_catalog.pg_class c \
                 JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace WHERE c.relname = ",
            );
            builder
                .bind(tblseq.as_str())
                .push_bind(" AND n.nspname = ", application_schema.as_str());
            builder.build()
        }
        DefinitionOperation::Assign { definition, kind } => assign(dialect, definition, *kind),
        DefinitionOperation::Update { definition, kind } => update(dialect, definition, *kind),
        DefinitionOperation::Remove { key } => {
            let mut builder = Statement::builder(&format!(
                "DELETE FROM {schema}.emaj_group_def WHERE grpdef_schema = "
            ));
            builder
                .bind(key.schema.as_str())
                .push_bind(" AND grpdef_tblseq = ", key.tblseq.as_str())
                .push_bind(" AND grpdef_group = ", key.group.as_str());
            builder.build()
        }
    }
}
