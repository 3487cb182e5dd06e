//! Reconciliation of rollbacks whose backing session died.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::helpers::{TestResult, as_admin, installed_at, orchestrator};
use emaj_gateway::database::adapters::{Reply, ScriptedExecutor};
use emaj_gateway::database::ports::Row;
use emaj_gateway::rollback::domain::{RollbackId, RollbackStatus};

fn operation_row(status: &str) -> Row {
    Row::new()
        .with("rlbk_id", 17)
        .with("rlbk_groups", vec!["payroll"])
        .with("rlbk_mark", "EOD")
        .with("rlbk_mark_datetime", "2024-05-01T12:00:00+00:00")
        .with("rlbk_is_logged", false)
        .with("rlbk_nb_session", 1)
        .with("rlbk_nb_table", 4)
        .with("rlbk_nb_sequence", 1)
        .with("rlbk_eff_nb_table", 2)
        .with("rlbk_status", status)
        .with("rlbk_start_datetime", "2024-05-01T12:30:00+00:00")
        .with("rlbk_end_datetime", "2024-05-01T12:35:00+00:00")
        .with("rlbk_duration", "00:05:00")
        .with("rlbk_elapse", "00:05:00")
        .with("rlbk_remaining", serde_json::Value::Null)
        .with("rlbk_completion_pct", 40)
}

/// Extension state holding one rollback whose client died while
/// executing; the cleanup function flips it to aborted.
fn abandoned_rollback() -> ScriptedExecutor {
    let cleaned = Arc::new(AtomicBool::new(false));
    let on_cleanup = Arc::clone(&cleaned);
    let on_activity = Arc::clone(&cleaned);
    let on_history = Arc::clone(&cleaned);
    as_admin(installed_at("4.1.0"))
        .on_dynamic("emaj_cleanup_rollback_state()", move |_| {
            let newly = !on_cleanup.swap(true, Ordering::SeqCst);
            Ok(Reply::Rows(vec![
                Row::new().with("nb_cleaned", i64::from(newly)),
            ]))
        })
        .on_dynamic("emaj_rollback_activity()", move |_| {
            let rows = if on_activity.load(Ordering::SeqCst) {
                Vec::new()
            } else {
                vec![operation_row("EXECUTING")]
            };
            Ok(Reply::Rows(rows))
        })
        .on_dynamic("emaj_rlbk WHERE", move |_| {
            let rows = if on_history.load(Ordering::SeqCst) {
                vec![operation_row("ABORTED")]
            } else {
                Vec::new()
            };
            Ok(Reply::Rows(rows))
        })
}

#[tokio::test]
async fn listing_completed_operations_reconciles_dead_sessions() -> TestResult {
    let executor = abandoned_rollback();
    let orchestrator = orchestrator(executor.clone());

    let running = orchestrator.in_progress().await?;
    assert_eq!(
        running.iter().map(|op| op.status).collect::<Vec<_>>(),
        vec![RollbackStatus::Executing]
    );

    let completed = orchestrator.completed(None, None).await?;
    assert_eq!(completed.len(), 1);
    let aborted = completed
        .first()
        .ok_or_else(|| eyre::eyre!("no completed operation"))?;
    assert_eq!(aborted.id, RollbackId::new(17)?);
    assert_eq!(aborted.status, RollbackStatus::Aborted);
    assert_eq!(aborted.duration.as_deref(), Some("00:05:00"));

    assert!(orchestrator.in_progress().await?.is_empty());
    assert_eq!(executor.count_matching("emaj_cleanup_rollback_state()"), 1);
    Ok(())
}

#[tokio::test]
async fn explicit_reconciliation_reports_the_number_of_operations() -> TestResult {
    let orchestrator = orchestrator(abandoned_rollback());

    assert_eq!(orchestrator.reconcile().await?, 1);
    assert_eq!(orchestrator.reconcile().await?, 0);
    let id = RollbackId::new(17)?;
    assert!(orchestrator.progress(id).await?.is_none());
    Ok(())
}
