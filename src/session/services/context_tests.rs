//! Tests for the session context.

use super::EmajSession;
use crate::config::GatewayConfig;
use crate::database::adapters::ScriptedExecutor;
use crate::database::adapters::Reply;
use crate::database::ports::{ExecutorError, Row};
use crate::dialect::SqlParam;
use crate::session::domain::{AccessError, ServerIdentity};

fn identity() -> ServerIdentity {
    ServerIdentity::new("alice", "app")
}

fn session(executor: ScriptedExecutor) -> EmajSession<ScriptedExecutor> {
    EmajSession::new(executor, identity(), GatewayConfig::default())
}

fn installed() -> ScriptedExecutor {
    ScriptedExecutor::new().on_value("pg_namespace WHERE nspname", "schema_name", "emaj")
}

#[tokio::test]
async fn admin_probe_is_memoized() {
    let executor = installed().on_value("rolsuper", "is_superuser", true);
    let session = session(executor.clone());

    assert!(session.probe_admin().await);
    assert!(session.probe_admin().await);

    assert_eq!(executor.count_matching("rolsuper"), 1);
    assert_eq!(executor.count_matching("pg_has_role"), 0);
}

#[tokio::test]
async fn non_superuser_falls_back_to_role_membership() {
    let executor = installed()
        .on_value("rolsuper", "is_superuser", false)
        .on_value("pg_has_role", "has_role", 1);
    let session = session(executor.clone());

    assert!(session.probe_admin().await);
    assert!(session.probe_viewer().await);
    assert!(session.probe_admin().await);

    assert_eq!(executor.count_matching("pg_has_role"), 1);
}

#[tokio::test]
async fn probe_faults_are_cached_as_negative() {
    let executor = installed()
        .on_error("rolsuper", ExecutorError::connection("lost"))
        .on_error("pg_has_role", ExecutorError::connection("lost"));
    let session = session(executor.clone());

    assert!(!session.probe_admin().await);
    assert!(!session.probe_admin().await);
    assert_eq!(executor.count_matching("rolsuper"), 1);
}

#[tokio::test]
async fn missing_schema_disables_everything() {
    let executor = ScriptedExecutor::new().on_value("rolsuper", "is_superuser", true);
    let session = session(executor);

    assert!(!session.probe_enabled().await);
    assert!(!session.probe_accessible().await);
    assert_eq!(session.resolve_version().await.numeric(), 0);
    assert_eq!(
        session.ensure_accessible().await,
        Err(AccessError::ExtensionNotInstalled {
            schema: "emaj".to_owned()
        })
    );
}

#[tokio::test]
async fn renamed_schema_is_used_for_later_statements() {
    let executor = ScriptedExecutor::new()
        .on_value("pg_namespace WHERE nspname", "schema_name", "audit")
        .on_value("param_table", "param_table", "emaj_visible_param")
        .on_value("emaj_version", "version", "4.1.0");
    let config = GatewayConfig::default().with_extension_schema("audit");
    let session = EmajSession::new(executor.clone(), identity(), config);

    assert_eq!(session.resolve_version().await.raw(), "4.1.0");
    assert_eq!(session.dialect().await.quoted_schema(), "\"audit\"");
    assert_eq!(
        executor.count_matching("FROM \"audit\".emaj_visible_param"),
        1
    );
}

#[tokio::test]
async fn legacy_parameter_table_is_read_when_view_is_absent() {
    let executor = installed()
        .on_value("param_table", "param_table", "emaj_param")
        .on_value("emaj_version", "version", "1.0.5");
    let session = session(executor.clone());

    let version = session.resolve_version().await;

    assert_eq!(version.numeric(), 10_005);
    assert_eq!(executor.count_matching("FROM \"emaj\".emaj_param"), 1);
}

#[tokio::test]
async fn unparseable_version_defaults_to_oldest_dialect() {
    let executor = installed()
        .on_value("param_table", "param_table", "emaj_visible_param")
        .on_value("emaj_version", "version", "<devel>");
    let session = session(executor.clone());

    assert_eq!(session.resolve_version().await.raw(), "?");
    assert_eq!(session.dialect().await.numeric_version(), 0);
    session.resolve_version().await;
    assert_eq!(executor.count_matching("emaj_version"), 1);
}

#[tokio::test]
async fn viewer_cannot_pass_the_admin_gate() {
    let executor = installed()
        .on_value("rolsuper", "is_superuser", false)
        .on_dynamic("pg_has_role", |statement| {
            let is_viewer_check = statement
                .params()
                .iter()
                .any(|param| *param == SqlParam::from("emaj_viewer"));
            Ok(Reply::Rows(vec![
                Row::new().with("has_role", is_viewer_check),
            ]))
        });
    let session = session(executor);

    assert_eq!(session.ensure_accessible().await, Ok(()));
    assert_eq!(session.ensure_admin().await, Err(AccessError::AdminRequired));
}

#[tokio::test]
async fn cross_link_probe_always_closes_the_test_link() {
    let executor = installed().on_value("_dblink_open_cnx", "cnx_ok", false);
    let session = session(executor.clone());

    assert!(!session.probe_cross_link_usable().await);
    assert!(!session.probe_cross_link_usable().await);
    assert_eq!(executor.count_matching("_dblink_close_cnx"), 1);
}

#[tokio::test]
async fn async_probe_needs_both_paths() {
    let config = GatewayConfig::default().with_temp_dir(
        camino::Utf8PathBuf::try_from(std::env::temp_dir()).expect("utf-8 temp dir"),
    );
    let session = EmajSession::new(installed(), identity(), config);

    assert!(!session.probe_async_usable().await);
}

#[tokio::test]
async fn snapshot_collects_every_probe() {
    let executor = installed().on_value("rolsuper", "is_superuser", true);
    let session = session(executor);

    let snapshot = session.snapshot().await;

    assert!(snapshot.installed);
    assert!(snapshot.is_admin);
    assert!(snapshot.is_viewer);
    assert!(snapshot.is_accessible());
    assert!(!snapshot.async_usable);
    assert_eq!(snapshot.schema_name, "emaj");
}
