//! Statements that run before the extension version is known.
//!
//! Capability probes and the version lookup itself cannot depend on a
//! [`super::Dialect`], so they are rendered here from the schema name alone.

use super::{quote_ident, Statement};

/// Role granting full administration of the extension.
pub const ADMIN_ROLE: &str = "emaj_adm";

/// Role granting read-only access to the extension.
pub const VIEWER_ROLE: &str = "emaj_viewer";

/// Connection name used when testing the cross-session link.
pub const CROSS_LINK_TEST_CONNECTION: &str = "test";

/// Where the extension publishes its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// `emaj_visible_param` view of recent releases.
    VisibleParam,
    /// `emaj_param` table of older releases.
    LegacyParam,
}

impl ParamSource {
    /// Returns the relation name.
    #[must_use]
    pub const fn relation(self) -> &'static str {
        match self {
            Self::VisibleParam => "emaj_visible_param",
            Self::LegacyParam => "emaj_param",
        }
    }

    /// Maps the relation name reported by [`param_source`].
    #[must_use]
    pub fn from_relation(name: &str) -> Self {
        if name == Self::VisibleParam.relation() {
            Self::VisibleParam
        } else {
            Self::LegacyParam
        }
    }
}

/// Looks the extension schema up in the namespace catalog.
#[must_use]
pub fn find_schema(schema: &str) -> Statement {
    let mut builder = Statement::builder(
        "SELECT nspname::text AS schema_name FROM pg_catalog.pg_namespace WHERE nspname = ",
    );
    builder.bind(schema);
    builder.build()
}

/// Reports whether `role_name` has superuser rank.
#[must_use]
pub fn is_superuser(role_name: &str) -> Statement {
    let mut builder = Statement::builder(
        "SELECT coalesce((SELECT rolsuper FROM pg_catalog.pg_roles WHERE rolname = ",
    );
    builder.bind(role_name).push("), false) AS is_superuser");
    builder.build()
}

/// Reports whether the current principal is a member of `role`.
///
/// Unknown roles report `false` instead of raising an error.
#[must_use]
pub fn has_role(role: &str) -> Statement {
    let mut builder = Statement::builder(
        "SELECT CASE WHEN EXISTS (SELECT 1 FROM pg_catalog.pg_roles WHERE rolname = ",
    );
    builder
        .bind(role)
        .push(") THEN pg_catalog.pg_has_role(")
        .bind(role)
        .push(", 'USAGE') ELSE false END AS has_role");
    builder.build()
}

/// Opens the test cross-session connection when the principal may execute
/// the extension's open helper.
#[must_use]
pub fn open_cross_link(schema: &str) -> Statement {
    let quoted = quote_ident(schema);
    let mut builder = Statement::builder("SELECT CASE WHEN pg_catalog.has_function_privilege(");
    builder
        .bind(format!("{quoted}._dblink_open_cnx(text)"))
        .push(", 'EXECUTE') THEN ")
        .push(&quoted)
        .push_bind("._dblink_open_cnx(", CROSS_LINK_TEST_CONNECTION)
        .push(") >= 0 ELSE false END AS cnx_ok");
    builder.build()
}

/// Closes the test cross-session connection.
#[must_use]
pub fn close_cross_link(schema: &str) -> Statement {
    let mut builder = Statement::builder("SELECT ");
    builder
        .push(&quote_ident(schema))
        .push_bind("._dblink_close_cnx(", CROSS_LINK_TEST_CONNECTION)
        .push(")");
    builder.build()
}

/// Reports which parameter relation the installed release provides.
#[must_use]
pub fn param_source(schema: &str) -> Statement {
    let mut builder = Statement::builder(
        "SELECT CASE WHEN EXISTS (SELECT 1 FROM pg_catalog.pg_class c \
         JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
         WHERE c.relname = 'emaj_visible_param' AND n.nspname = ",
    );
    builder
        .bind(schema)
        .push(") THEN 'emaj_visible_param' ELSE 'emaj_param' END AS param_table");
    builder.build()
}

/// Reads the `emaj_version` parameter.
#[must_use]
pub fn read_version(schema: &str, source: ParamSource) -> Statement {
    Statement::raw(format!(
        "SELECT param_value_text AS version FROM {}.{} WHERE param_key = 'emaj_version'",
        quote_ident(schema),
        source.relation()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqlParam;

    #[test]
    fn schema_lookup_binds_the_name() {
        let statement = find_schema("emaj");
        assert!(statement.sql().ends_with("WHERE nspname = $1"));
        assert_eq!(statement.params(), &[SqlParam::Text("emaj".to_owned())]);
    }

    #[test]
    fn cross_link_probe_checks_execute_privilege_on_the_quoted_helper() {
        let statement = open_cross_link("my emaj");
        assert!(statement.sql().contains("\"my emaj\"._dblink_open_cnx($2)"));
        assert_eq!(
            statement.params(),
            &[
                SqlParam::Text("\"my emaj\"._dblink_open_cnx(text)".to_owned()),
                SqlParam::Text("test".to_owned()),
            ]
        );
    }

    #[test]
    fn version_reads_from_the_selected_relation() {
        let statement = read_version("emaj", ParamSource::LegacyParam);
        assert!(statement.sql().contains("FROM \"emaj\".emaj_param "));
        assert_eq!(
            ParamSource::from_relation("emaj_visible_param"),
            ParamSource::VisibleParam
        );
    }
}
