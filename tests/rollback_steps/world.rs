//! Shared world state for rollback BDD scenarios.

use std::sync::Arc;

use emaj_gateway::config::GatewayConfig;
use emaj_gateway::database::adapters::ScriptedExecutor;
use emaj_gateway::rollback::adapters::RecordingLauncher;
use emaj_gateway::rollback::domain::AsyncRollbackTicket;
use emaj_gateway::rollback::{RollbackError, RollbackOrchestrator};
use emaj_gateway::session::{EmajSession, ServerIdentity};
use rstest::fixture;

/// Orchestrator type used by the BDD world.
pub type TestOrchestrator = RollbackOrchestrator<ScriptedExecutor, RecordingLauncher>;

/// Scenario world for rollback behaviour tests.
///
/// Given steps add rules to the scripted extension; the orchestrator is
/// built on first use so that every probe sees the complete script.
pub struct RollbackWorld {
    /// Scripted extension state.
    pub executor: ScriptedExecutor,
    /// Launcher recording asynchronous submissions.
    pub launcher: RecordingLauncher,
    /// Result of the last synchronous rollback.
    pub last_rollback: Option<Result<i64, RollbackError>>,
    /// Result of the last asynchronous submission.
    pub last_submission: Option<Result<AsyncRollbackTicket, RollbackError>>,
}

impl RollbackWorld {
    /// Creates a world around an extension that answers nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            executor: ScriptedExecutor::new(),
            launcher: RecordingLauncher::new(),
            last_rollback: None,
            last_submission: None,
        }
    }

    /// Builds an orchestrator over the scripted extension without any
    /// asynchronous client configured.
    #[must_use]
    pub fn orchestrator(&self) -> TestOrchestrator {
        let session = EmajSession::new(
            self.executor.clone(),
            ServerIdentity::new("alice", "app"),
            GatewayConfig::default(),
        );
        RollbackOrchestrator::new(Arc::new(session), Arc::new(self.launcher.clone()))
    }
}

impl Default for RollbackWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RollbackWorld {
    RollbackWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
