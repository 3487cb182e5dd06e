//! Version resolution and dialect selection through a live session.

use super::helpers::{
    TestResult, as_admin, catalog, group, installed_at, mark, orchestrator, session,
};
use emaj_gateway::database::adapters::ScriptedExecutor;
use rstest::rstest;

#[rstest]
#[case("0.11.1", "emaj_estimate_rollback_duration(")]
#[case("1.0.2", "emaj_estimate_rollback_duration(")]
#[case("1.1.0", "emaj_estimate_rollback_group(")]
#[case("4.1.0", "emaj_estimate_rollback_group(")]
#[case("devel", "emaj_estimate_rollback_duration(")]
#[tokio::test]
async fn estimator_follows_the_installed_release(
    #[case] version: &str,
    #[case] expected_call: &str,
) -> TestResult {
    let executor = installed_at(version)
        .on_value("rolsuper", "is_superuser", false)
        .on_value("pg_has_role", "has_role", true);
    let orchestrator = orchestrator(executor.clone());

    orchestrator.estimate(&group("payroll")?, &mark("EOD")?).await?;

    assert_eq!(executor.count_matching(expected_call), 1);
    Ok(())
}

#[tokio::test]
async fn version_is_read_once_per_session() -> TestResult {
    let executor = installed_at("4.1.0").on_value("rolsuper", "is_superuser", true);
    let orchestrator = orchestrator(executor.clone());

    orchestrator.estimate(&group("payroll")?, &mark("EOD")?).await?;
    orchestrator.estimate(&group("sales")?, &mark("EOD")?).await?;
    orchestrator.in_progress().await?;

    assert_eq!(executor.count_matching("'emaj_version'"), 1);
    assert_eq!(executor.count_matching("rolsuper"), 1);
    Ok(())
}

#[tokio::test]
async fn legacy_parameter_table_is_used_when_the_view_is_missing() -> TestResult {
    let executor = ScriptedExecutor::new()
        .on_value("pg_namespace WHERE nspname", "schema_name", "emaj")
        .on_value("AS param_table", "param_table", "emaj_param")
        .on_value("'emaj_version'", "version", "0.11.1");
    let session = session(executor.clone());

    let version = session.resolve_version().await;

    assert_eq!(version.numeric(), 1_101);
    assert!(
        executor
            .statements()
            .iter()
            .any(|statement| statement.sql().contains("\"emaj\".emaj_param "))
    );
    Ok(())
}

#[tokio::test]
async fn missing_extension_resolves_to_the_oldest_dialect() -> TestResult {
    let session = session(ScriptedExecutor::new());

    let dialect = session.dialect().await;

    assert_eq!(dialect.numeric_version(), 0);
    assert!(!session.resolve_version().await.is_known());
    Ok(())
}

#[tokio::test]
async fn release_1_0_5_lists_idle_groups_through_the_text_state() -> TestResult {
    let executor = as_admin(installed_at("1.0.5"));
    let catalog = catalog(executor.clone());

    let idle = catalog.list_idle_groups().await?;

    assert!(idle.is_empty());
    assert_eq!(catalog.session().resolve_version().await.numeric(), 10_005);
    let sql: Vec<String> = executor
        .statements()
        .into_iter()
        .map(|statement| statement.sql().to_owned())
        .collect();
    assert!(sql.iter().any(|text| text.contains("group_state = 'IDLE'")));
    assert!(!sql.iter().any(|text| text.contains("NOT group_is_logging")));
    Ok(())
}
