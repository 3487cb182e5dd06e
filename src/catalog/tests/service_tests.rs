//! Unit tests for catalog service orchestration.

use std::sync::Arc;

use crate::catalog::domain::{
    DefinitionKey, GroupDefinition, GroupName, GroupSelection, MarkName, StalePrecondition,
};
use crate::catalog::services::{CatalogError, CatalogService, UNAVAILABLE};
use crate::config::GatewayConfig;
use crate::database::adapters::{JournalEntry, Reply, ScriptedExecutor};
use crate::database::ports::{ExecutorError, Row};
use crate::dialect::SqlParam;
use crate::session::{AccessError, EmajSession, ServerIdentity};
use rstest::{fixture, rstest};

type TestService = CatalogService<ScriptedExecutor>;

fn group(name: &str) -> GroupName {
    GroupName::new(name).expect("valid group name")
}

fn mark(name: &str) -> MarkName {
    MarkName::new(name).expect("valid mark name")
}

fn selection(names: &[&str]) -> GroupSelection {
    GroupSelection::parse(names.iter().copied()).expect("valid selection")
}

/// Installed extension at version 4.1.0.
fn installed() -> ScriptedExecutor {
    ScriptedExecutor::new()
        .on_value("pg_namespace WHERE nspname", "schema_name", "emaj")
        .on_value("AS param_table", "param_table", "emaj_visible_param")
        .on_value("'emaj_version'", "version", "4.1.0")
}

fn as_admin(executor: ScriptedExecutor) -> ScriptedExecutor {
    executor.on_value("rolsuper", "is_superuser", true)
}

fn as_viewer(executor: ScriptedExecutor) -> ScriptedExecutor {
    executor
        .on_value("rolsuper", "is_superuser", false)
        .on_dynamic("pg_has_role", |statement| {
            let viewer = statement
                .params()
                .contains(&SqlParam::from("emaj_viewer"));
            Ok(Reply::Rows(vec![
                Row::new().with("has_role", viewer),
            ]))
        })
}

fn service(executor: ScriptedExecutor) -> TestService {
    let session = EmajSession::new(
        executor,
        ServerIdentity::new("alice", "app"),
        GatewayConfig::default(),
    );
    CatalogService::new(Arc::new(session))
}

fn state_row(name: &str, is_logging: bool) -> Row {
    Row::new()
        .with("group_name", name)
        .with("group_is_rollbackable", true)
        .with("group_is_logging", is_logging)
}

fn mark_row(name: &str, log_rows: i64, is_deleted: bool) -> Row {
    Row::new()
        .with("mark_group", "payroll")
        .with("mark_name", name)
        .with("mark_datetime", "2024-05-01T12:00:00+00:00")
        .with("mark_comment", serde_json::Value::Null)
        .with("mark_is_deleted", is_deleted)
        .with("mark_log_rows", log_rows)
}

#[fixture]
fn definition_key() -> DefinitionKey {
    DefinitionKey::new("app", "orders", group("payroll")).expect("valid key")
}

fn transaction_events(executor: &ScriptedExecutor) -> Vec<JournalEntry> {
    executor
        .journal()
        .into_iter()
        .filter(|entry| entry.statement().is_none())
        .collect()
}

#[rstest]
#[tokio::test]
async fn removing_a_missing_row_reports_no_match_and_rolls_back(definition_key: DefinitionKey) {
    let executor = as_admin(installed()).on_affected("DELETE FROM", 0);
    let service = service(executor.clone());

    let result = service.remove_tblseq(&definition_key).await;

    assert!(matches!(result, Err(CatalogError::NoMatch(key)) if key == definition_key));
    assert_eq!(
        transaction_events(&executor),
        vec![JournalEntry::Begin, JournalEntry::Rollback]
    );
}

#[rstest]
#[tokio::test]
async fn removing_a_duplicated_row_reports_ambiguous_match(definition_key: DefinitionKey) {
    let executor = as_admin(installed()).on_affected("DELETE FROM", 2);
    let service = service(executor.clone());

    let result = service.remove_tblseq(&definition_key).await;

    assert!(matches!(
        result,
        Err(CatalogError::AmbiguousMatch { count: 2, .. })
    ));
    assert_eq!(
        transaction_events(&executor),
        vec![JournalEntry::Begin, JournalEntry::Rollback]
    );
}

#[rstest]
#[tokio::test]
async fn removing_one_row_commits(definition_key: DefinitionKey) {
    let executor = as_admin(installed()).on_affected("DELETE FROM", 1);
    let service = service(executor.clone());

    service
        .remove_tblseq(&definition_key)
        .await
        .expect("removal should succeed");

    assert_eq!(
        transaction_events(&executor),
        vec![JournalEntry::Begin, JournalEntry::Commit]
    );
    let delete = executor
        .statements()
        .into_iter()
        .find(|statement| statement.sql().starts_with("DELETE FROM"))
        .expect("delete statement recorded");
    assert_eq!(
        delete.params(),
        &[
            SqlParam::from("app"),
            SqlParam::from("orders"),
            SqlParam::from("payroll"),
        ]
    );
}

#[rstest]
#[case(0)]
#[case(2)]
#[tokio::test]
async fn updates_not_touching_exactly_one_row_are_rolled_back(
    definition_key: DefinitionKey,
    #[case] affected: u64,
) {
    let executor = as_admin(installed()).on_affected("UPDATE ", affected);
    let service = service(executor.clone());

    let result = service
        .update_tblseq(&GroupDefinition::new(definition_key.clone()).with_priority(2))
        .await;

    match affected {
        0 => assert!(matches!(result, Err(CatalogError::NoMatch(key)) if key == definition_key)),
        _ => assert!(matches!(
            result,
            Err(CatalogError::AmbiguousMatch { count: 2, .. })
        )),
    }
    assert_eq!(
        transaction_events(&executor),
        vec![JournalEntry::Begin, JournalEntry::Rollback]
    );
}

#[rstest]
#[tokio::test]
async fn updating_one_row_commits(definition_key: DefinitionKey) {
    let executor = as_admin(installed()).on_affected("UPDATE ", 1);
    let service = service(executor.clone());

    service
        .update_tblseq(&GroupDefinition::new(definition_key))
        .await
        .expect("update should succeed");

    assert_eq!(
        transaction_events(&executor),
        vec![JournalEntry::Begin, JournalEntry::Commit]
    );
}

#[rstest]
#[tokio::test]
async fn failed_removal_is_rolled_back(definition_key: DefinitionKey) {
    let executor = as_admin(installed())
        .on_error("DELETE FROM", ExecutorError::connection("server closed the connection"));
    let service = service(executor.clone());

    let result = service.remove_tblseq(&definition_key).await;

    assert!(matches!(result, Err(CatalogError::Executor(_))));
    assert_eq!(
        transaction_events(&executor),
        vec![JournalEntry::Begin, JournalEntry::Rollback]
    );
}

#[tokio::test]
async fn viewers_cannot_mutate() {
    let executor = as_viewer(installed());
    let service = service(executor.clone());

    let result = service.create_group(&group("payroll"), true).await;

    assert!(matches!(
        result,
        Err(CatalogError::Access(AccessError::AdminRequired))
    ));
    assert_eq!(executor.count_matching("emaj_create_group"), 0);
}

#[tokio::test]
async fn missing_extension_blocks_reads() {
    let service = service(ScriptedExecutor::new());

    let result = service.list_groups().await;

    assert!(matches!(
        result,
        Err(CatalogError::Access(AccessError::ExtensionNotInstalled { .. }))
    ));
}

#[tokio::test]
async fn starting_a_logging_group_is_stale() {
    let executor = as_admin(installed()).on(
        "group_name = ANY(",
        vec![state_row("payroll", false), state_row("sales", true)],
    );
    let service = service(executor.clone());

    let result = service
        .start_groups(&selection(&["payroll", "sales"]), &mark("m1"), true)
        .await;

    assert!(matches!(
        result,
        Err(CatalogError::StalePrecondition(StalePrecondition::GroupsNotIdle(groups)))
            if groups == vec!["sales".to_owned()]
    ));
    assert_eq!(executor.count_matching("emaj_start_group"), 0);
}

#[tokio::test]
async fn starting_an_unknown_group_is_stale() {
    let executor = as_admin(installed()).on("group_name = ANY(", vec![state_row("payroll", false)]);
    let service = service(executor);

    let result = service
        .start_groups(&selection(&["payroll", "ghost"]), &mark("m1"), true)
        .await;

    assert!(matches!(
        result,
        Err(CatalogError::StalePrecondition(StalePrecondition::UnknownGroup(name)))
            if name == "ghost"
    ));
}

#[tokio::test]
async fn starting_idle_groups_returns_the_processed_count() {
    let executor = as_admin(installed())
        .on(
            "group_name = ANY(",
            vec![state_row("payroll", false), state_row("sales", false)],
        )
        .on_value("emaj_start_groups", "nbtblseq", 12);
    let service = service(executor.clone());

    let count = service
        .start_groups(&selection(&["payroll", "sales"]), &mark("m1"), false)
        .await
        .expect("start should succeed");

    assert_eq!(count, 12);
    assert_eq!(executor.count_matching("mark_count"), 1);
    assert_eq!(executor.count_matching(", false) AS nbtblseq"), 1);
}

#[tokio::test]
async fn setting_an_existing_mark_name_is_stale() {
    let executor = as_admin(installed())
        .on("group_name = ANY(", vec![state_row("payroll", true)])
        .on_value("AS mark_count", "mark_count", 1);
    let service = service(executor.clone());

    let result = service.set_mark(&selection(&["payroll"]), &mark("EOD")).await;

    assert!(matches!(
        result,
        Err(CatalogError::StalePrecondition(StalePrecondition::MarkAlreadyExists(name)))
            if name == "EOD"
    ));
    assert_eq!(executor.count_matching("emaj_set_mark_group"), 0);
}

#[tokio::test]
async fn marks_carry_cumulative_log_rows() {
    let executor = as_admin(installed()).on(
        "emaj_mark WHERE mark_group",
        vec![
            mark_row("m3", 5, false),
            mark_row("m2", 10, false),
            mark_row("m1", 1, true),
        ],
    );
    let service = service(executor);

    let marks = service
        .list_marks(&group("payroll"))
        .await
        .expect("marks should load");

    let cumulative: Vec<i64> = marks.iter().map(|m| m.cumulative_log_rows).collect();
    assert_eq!(cumulative, vec![5, 15, 16]);
    assert_eq!(
        marks.iter().map(|m| m.is_active).collect::<Vec<_>>(),
        vec![true, true, false]
    );
}

#[tokio::test]
async fn deleting_a_vanished_mark_is_stale() {
    let executor = as_admin(installed());
    let service = service(executor.clone());

    let result = service.delete_mark(&group("payroll"), &mark("gone")).await;

    assert!(matches!(
        result,
        Err(CatalogError::StalePrecondition(StalePrecondition::UnknownMark { .. }))
    ));
    assert_eq!(executor.count_matching("emaj_delete_mark_group"), 0);
}

#[rstest]
#[case(2, true)]
#[case(1, false)]
#[tokio::test]
async fn rollback_mark_must_be_active_in_every_group(#[case] matching: i64, #[case] valid: bool) {
    let executor = as_admin(installed()).on_value("AS mark_count", "mark_count", matching);
    let service = service(executor);

    let result = service
        .is_rollback_mark_valid(&selection(&["payroll", "sales"]), &mark("EOD"))
        .await
        .expect("check should succeed");

    assert_eq!(result, valid);
}

#[tokio::test]
async fn extension_size_is_hidden_from_viewers() {
    let executor = as_viewer(installed());
    let service = service(executor.clone());

    let size = service.extension_size().await.expect("size should load");

    assert_eq!(size, UNAVAILABLE);
    assert_eq!(executor.count_matching("emaj_size"), 0);
}

#[tokio::test]
async fn sequences_are_assigned_without_log_attributes() {
    let executor = as_admin(installed())
        .on_value("AS relkind", "relkind", "S")
        .on_affected("INSERT INTO", 1);
    let service = service(executor.clone());
    let definition = GroupDefinition::new(
        DefinitionKey::new("app", "orders_seq", group("payroll")).expect("valid key"),
    )
    .with_priority(3)
    .with_log_schema_suffix("app")
    .with_tablespaces("fast", "fast");

    let inserted = service
        .assign_tblseq(&definition)
        .await
        .expect("assignment should succeed");

    assert_eq!(inserted, 1);
    let insert = executor
        .statements()
        .into_iter()
        .find(|statement| statement.sql().starts_with("INSERT INTO"))
        .expect("insert recorded");
    let nulls = insert
        .params()
        .iter()
        .filter(|param| **param == SqlParam::NullableText(None))
        .count();
    assert_eq!(nulls, 4);
    assert_eq!(insert.params().get(3), Some(&SqlParam::NullableInt(Some(3))));
}

#[tokio::test]
async fn log_statistics_are_summarised() {
    let stat = |table: &str, rows: i64| {
        Row::new()
            .with("stat_group", "payroll")
            .with("stat_schema", "app")
            .with("stat_table", table)
            .with("stat_rows", rows)
            .with("sql_text", format!("select * from app.{table}_log"))
    };
    let executor = as_admin(installed()).on(
        "emaj_log_stat_group(",
        vec![stat("orders", 7), stat("lines", 3)],
    );
    let service = service(executor);

    let report = service
        .log_stats(&group("payroll"), &mark("m1"), None)
        .await
        .expect("statistics should load");

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.summary.total_rows, 10);
    assert_eq!(report.summary.table_count, 2);
}
