//! Catalog flows: state re-reads before mutations and transactional
//! definition removal.

use super::helpers::{TestResult, as_admin, catalog, group, groups, installed_at, mark, state_row};
use emaj_gateway::catalog::CatalogError;
use emaj_gateway::catalog::domain::{DefinitionKey, StalePrecondition};
use emaj_gateway::database::adapters::JournalEntry;

fn position(journal: &[JournalEntry], fragment: &str) -> Option<usize> {
    journal.iter().position(|entry| {
        entry
            .statement()
            .is_some_and(|statement| statement.sql().contains(fragment))
    })
}

#[tokio::test]
async fn setting_a_mark_rereads_group_state_first() -> TestResult {
    let executor = as_admin(installed_at("4.1.0"))
        .on(
            "group_name = ANY(",
            vec![state_row("payroll", true, true), state_row("sales", true, true)],
        )
        .on_value("emaj_set_mark_groups", "nbtblseq", 9);
    let service = catalog(executor.clone());

    let processed = service
        .set_mark(&groups(&["payroll", "sales"])?, &mark("EOD")?)
        .await?;

    assert_eq!(processed, 9);
    let journal = executor.journal();
    let reread = position(&journal, "group_name = ANY(");
    let new_name = position(&journal, "AS mark_count");
    let mutation = position(&journal, "emaj_set_mark_groups");
    assert!(reread.is_some() && reread < new_name && new_name < mutation);
    Ok(())
}

#[tokio::test]
async fn stopping_an_idle_group_is_reported_as_stale() -> TestResult {
    let executor = as_admin(installed_at("4.1.0"))
        .on("group_name = ANY(", vec![state_row("payroll", true, false)]);
    let service = catalog(executor.clone());

    let result = service
        .stop_groups(&groups(&["payroll"])?, None)
        .await;

    assert!(matches!(
        result,
        Err(CatalogError::StalePrecondition(StalePrecondition::GroupsNotLogging(_)))
    ));
    assert_eq!(executor.count_matching("emaj_stop_group"), 0);
    Ok(())
}

#[tokio::test]
async fn definition_removal_commits_a_single_row_delete() -> TestResult {
    let executor = as_admin(installed_at("1.2.0")).on_affected("DELETE FROM", 1);
    let service = catalog(executor.clone());
    let key = DefinitionKey::new("app", "orders", group("payroll")?)?;

    service.remove_tblseq(&key).await?;

    let events: Vec<&str> = executor
        .journal()
        .iter()
        .filter_map(|entry| match entry {
            JournalEntry::Begin => Some("begin"),
            JournalEntry::Execute(_) => Some("execute"),
            JournalEntry::Commit => Some("commit"),
            JournalEntry::Rollback => Some("rollback"),
            JournalEntry::Select(_) => None,
        })
        .collect();
    assert_eq!(events, vec!["begin", "execute", "commit"]);
    Ok(())
}
