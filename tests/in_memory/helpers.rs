//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use emaj_gateway::catalog::CatalogService;
use emaj_gateway::catalog::domain::{GroupName, GroupSelection, MarkName};
use emaj_gateway::config::GatewayConfig;
use emaj_gateway::database::adapters::ScriptedExecutor;
use emaj_gateway::database::ports::Row;
use emaj_gateway::rollback::RollbackOrchestrator;
use emaj_gateway::rollback::adapters::RecordingLauncher;
use emaj_gateway::session::{EmajSession, ServerIdentity};

/// Result type for integration tests.
pub type TestResult = Result<(), eyre::Report>;

/// Orchestrator type used by integration tests.
pub type TestOrchestrator = RollbackOrchestrator<ScriptedExecutor, RecordingLauncher>;

/// Executor answering the bootstrap probes for an extension reporting
/// `version` through the visible-parameter view.
pub fn installed_at(version: &str) -> ScriptedExecutor {
    ScriptedExecutor::new()
        .on_value("pg_namespace WHERE nspname", "schema_name", "emaj")
        .on_value("AS param_table", "param_table", "emaj_visible_param")
        .on_value("'emaj_version'", "version", version)
}

/// Answers the superuser probe positively.
pub fn as_admin(executor: ScriptedExecutor) -> ScriptedExecutor {
    executor.on_value("rolsuper", "is_superuser", true)
}

/// Builds a session for `alice` on database `app`.
pub fn session(executor: ScriptedExecutor) -> Arc<EmajSession<ScriptedExecutor>> {
    Arc::new(EmajSession::new(
        executor,
        ServerIdentity::new("alice", "app"),
        GatewayConfig::default(),
    ))
}

/// Builds a catalog service over a fresh session.
pub fn catalog(executor: ScriptedExecutor) -> CatalogService<ScriptedExecutor> {
    CatalogService::new(session(executor))
}

/// Builds an orchestrator over a fresh session, recording launches.
pub fn orchestrator(executor: ScriptedExecutor) -> TestOrchestrator {
    RollbackOrchestrator::new(session(executor), Arc::new(RecordingLauncher::new()))
}

/// Row of the group state query.
pub fn state_row(name: &str, is_rollbackable: bool, is_logging: bool) -> Row {
    Row::new()
        .with("group_name", name)
        .with("group_is_rollbackable", is_rollbackable)
        .with("group_is_logging", is_logging)
}

/// Parses a group name.
///
/// # Errors
///
/// Returns an error when the name is empty.
pub fn group(name: &str) -> Result<GroupName, eyre::Report> {
    Ok(GroupName::new(name)?)
}

/// Parses a group selection.
///
/// # Errors
///
/// Returns an error when the selection is empty or a name is invalid.
pub fn groups(names: &[&str]) -> Result<GroupSelection, eyre::Report> {
    Ok(GroupSelection::parse(names.iter().copied())?)
}

/// Parses a mark name.
///
/// # Errors
///
/// Returns an error when the name is empty.
pub fn mark(name: &str) -> Result<MarkName, eyre::Report> {
    Ok(MarkName::new(name)?)
}
