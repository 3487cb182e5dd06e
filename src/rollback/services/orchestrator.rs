//! Synchronous and asynchronous rollback orchestration.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use super::decode;
use super::error::{RollbackError, RollbackResult};
use crate::catalog::CatalogService;
use crate::catalog::domain::{
    GroupName, GroupSelection, MarkName, RollbackTargetMark, StalePrecondition,
};
use crate::database::ports::{ExecutorResult, QueryExecutor, Row};
use crate::dialect::{Dialect, Operation, RollbackCommand, StatOperation, Statement};
use crate::rollback::domain::{
    AsyncRollbackTicket, RollbackEstimate, RollbackId, RollbackOperation, RollbackProgress,
    RollbackRequest,
};
use crate::rollback::ports::{LaunchSpec, ProcessLauncher};
use crate::session::EmajSession;

/// Drives rollbacks through the extension.
///
/// The orchestrator holds no per-operation state. An asynchronous rollback
/// is known only by the identifier the extension issued, and every later
/// observation re-queries the extension, so any orchestrator sharing the
/// database can poll an operation another one submitted.
pub struct RollbackOrchestrator<E, L, C = DefaultClock> {
    session: Arc<EmajSession<E>>,
    catalog: CatalogService<E>,
    launcher: Arc<L>,
    clock: Arc<C>,
}

impl<E, L, C> Clone for RollbackOrchestrator<E, L, C> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            catalog: self.catalog.clone(),
            launcher: Arc::clone(&self.launcher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<E, L> RollbackOrchestrator<E, L>
where
    E: QueryExecutor,
    L: ProcessLauncher,
{
    /// Creates an orchestrator stamping tickets with the system clock.
    #[must_use]
    pub fn new(session: Arc<EmajSession<E>>, launcher: Arc<L>) -> Self {
        Self::with_clock(session, launcher, Arc::new(DefaultClock))
    }
}

impl<E, L, C> RollbackOrchestrator<E, L, C>
where
    E: QueryExecutor,
    L: ProcessLauncher,
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator with an explicit clock.
    #[must_use]
    pub fn with_clock(session: Arc<EmajSession<E>>, launcher: Arc<L>, clock: Arc<C>) -> Self {
        Self {
            catalog: CatalogService::new(Arc::clone(&session)),
            session,
            launcher,
            clock,
        }
    }

    /// Returns the underlying session.
    #[must_use]
    pub const fn session(&self) -> &Arc<EmajSession<E>> {
        &self.session
    }

    async fn reader(&self) -> RollbackResult<&Dialect> {
        self.session.ensure_accessible().await?;
        Ok(self.session.dialect().await)
    }

    async fn writer(&self) -> RollbackResult<&Dialect> {
        self.session.ensure_admin().await?;
        Ok(self.session.dialect().await)
    }

    async fn select(
        &self,
        dialect: &Dialect,
        operation: impl Into<Operation> + Send,
    ) -> ExecutorResult<Vec<Row>> {
        let statement = dialect.render(&operation.into());
        self.session.executor().select_set(&statement).await
    }

    async fn select_int(
        &self,
        statement: &Statement,
        column: &str,
    ) -> ExecutorResult<Option<i64>> {
        match self.session.executor().select_field(statement, column).await? {
            Some(field) => field.opt_int(),
            None => Ok(None),
        }
    }

    /// Re-reads the selected groups and the target mark, failing when the
    /// rollback can no longer run as requested.
    async fn require_rollbackable(&self, request: &RollbackRequest) -> RollbackResult<()> {
        let states = self.catalog.group_states(&request.groups).await?;
        let mut not_rollbackable = Vec::new();
        let mut not_logging = Vec::new();
        for group in request.groups.groups() {
            let Some(state) = states.iter().find(|state| state.name == group.as_str()) else {
                return Err(StalePrecondition::UnknownGroup(group.as_str().to_owned()).into());
            };
            if !state.is_rollbackable {
                not_rollbackable.push(state.name.clone());
            } else if !state.is_logging {
                not_logging.push(state.name.clone());
            }
        }
        if !not_rollbackable.is_empty() {
            return Err(StalePrecondition::GroupsNotRollbackable(not_rollbackable).into());
        }
        if !not_logging.is_empty() {
            return Err(StalePrecondition::GroupsNotLogging(not_logging).into());
        }
        if !self
            .catalog
            .is_rollback_mark_valid(&request.groups, &request.mark)
            .await?
        {
            let mark = request.mark.as_str().to_owned();
            return Err(StalePrecondition::MarkNotActive(mark).into());
        }
        Ok(())
    }

    /// Rolls the requested groups back and waits for the extension to
    /// finish.
    ///
    /// Returns the number of tables and sequences processed.
    ///
    /// # Errors
    ///
    /// Returns [`RollbackError::Access`] for non-administrators,
    /// [`RollbackError::StalePrecondition`] when a group is no longer
    /// rollbackable and logging or the mark is no longer active, and
    /// [`RollbackError::Submission`] with the extension's failure otherwise.
    pub async fn rollback(&self, request: &RollbackRequest) -> RollbackResult<i64> {
        let dialect = self.writer().await?;
        self.require_rollbackable(request).await?;
        let statement = dialect.render(
            &RollbackCommand::Execute {
                groups: request.groups.clone(),
                mark: request.mark.clone(),
                is_logged: request.is_logged,
            }
            .into(),
        );
        let processed = self
            .select_int(&statement, "nbtblseq")
            .await
            .map_err(|source| RollbackError::Submission { id: None, source })?
            .unwrap_or(0);
        info!(
            groups = ?request.groups.to_names(),
            mark = %request.mark,
            is_logged = request.is_logged,
            processed,
            "groups rolled back"
        );
        Ok(processed)
    }

    /// Registers a rollback and runs it in a detached client.
    ///
    /// Returns as soon as the client is started. The ticket's identifier is
    /// the only way to follow the operation afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`RollbackError::AsyncUnavailable`] when the session cannot
    /// launch the client, the errors of [`RollbackOrchestrator::rollback`]
    /// for access and precondition failures, and [`RollbackError::Launch`]
    /// carrying the issued identifier when the client fails to start.
    pub async fn submit_async(
        &self,
        request: &RollbackRequest,
    ) -> RollbackResult<AsyncRollbackTicket> {
        let dialect = self.writer().await?;
        if !self.session.probe_async_usable().await {
            return Err(RollbackError::AsyncUnavailable);
        }
        let Some((psql, temp_dir)) = self.session.config().async_paths() else {
            return Err(RollbackError::AsyncUnavailable);
        };
        self.require_rollbackable(request).await?;

        let init = dialect.render(
            &RollbackCommand::InitAsync {
                groups: request.groups.clone(),
                mark: request.mark.clone(),
                is_logged: request.is_logged,
            }
            .into(),
        );
        let raw_id = self
            .select_int(&init, "rlbk_id")
            .await
            .map_err(|source| RollbackError::Submission { id: None, source })?
            .unwrap_or(0);
        let rollback_id = RollbackId::new(raw_id)?;

        let payload = dialect.render(&RollbackCommand::ExecuteAsync { id: rollback_id }.into());
        let report_path = temp_dir.join(format!("rlbk_{rollback_id}_report"));
        let spec = LaunchSpec {
            program: psql.to_path_buf(),
            args: vec!["-c".to_owned(), payload.sql().to_owned()],
            env: self.session.identity().client_environment(),
            report_path: report_path.clone(),
        };
        self.launcher
            .launch_detached(&spec)
            .await
            .map_err(|source| RollbackError::Launch {
                id: rollback_id,
                source,
            })?;
        info!(
            rollback_id = %rollback_id,
            groups = ?request.groups.to_names(),
            mark = %request.mark,
            report = %report_path,
            "asynchronous rollback submitted"
        );
        Ok(AsyncRollbackTicket {
            rollback_id,
            report_path,
            submitted_at: self.clock.utc(),
        })
    }

    /// Lists the rollbacks currently running, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RollbackError::Access`] when the extension is not readable
    /// and [`RollbackError::Executor`] when the query or decoding fails.
    pub async fn in_progress(&self) -> RollbackResult<Vec<RollbackProgress>> {
        let dialect = self.reader().await?;
        let rows = self
            .select(dialect, RollbackCommand::Activity { id: None })
            .await?;
        let mut running = decode::all(&rows, decode::progress)?;
        running.retain(|progress| progress.status.is_in_progress());
        Ok(running)
    }

    /// Returns the progress of one rollback, `None` once it is no longer
    /// running.
    ///
    /// # Errors
    ///
    /// See [`RollbackOrchestrator::in_progress`].
    pub async fn progress(&self, id: RollbackId) -> RollbackResult<Option<RollbackProgress>> {
        let dialect = self.reader().await?;
        let rows = self
            .select(dialect, RollbackCommand::Activity { id: Some(id) })
            .await?;
        let running = decode::all(&rows, decode::progress)?;
        Ok(running
            .into_iter()
            .find(|progress| progress.status.is_in_progress()))
    }

    /// Lists finished rollbacks, newest first, after reconciling operations
    /// whose session died.
    ///
    /// `limit` caps the number of rows and `retention_hours` drops older
    /// operations; non-positive values disable either filter. The
    /// reconciliation runs for administrators only and its failure does not
    /// prevent the listing.
    ///
    /// # Errors
    ///
    /// See [`RollbackOrchestrator::in_progress`].
    pub async fn completed(
        &self,
        limit: Option<i64>,
        retention_hours: Option<i32>,
    ) -> RollbackResult<Vec<RollbackOperation>> {
        let dialect = self.reader().await?;
        if self.session.probe_admin().await
            && let Err(err) = self.cleanup(dialect).await
        {
            warn!(error = %err, "rollback state cleanup failed");
        }
        let rows = self
            .select(
                dialect,
                RollbackCommand::Completed {
                    limit,
                    retention_hours,
                },
            )
            .await?;
        let mut finished = decode::all(&rows, decode::operation)?;
        finished.retain(|operation| operation.status.is_finished());
        Ok(finished)
    }

    /// Marks rollbacks whose backing session died as aborted.
    ///
    /// Returns the number of operations updated.
    ///
    /// # Errors
    ///
    /// Returns [`RollbackError::Access`] for non-administrators and
    /// [`RollbackError::Executor`] when the call fails.
    pub async fn reconcile(&self) -> RollbackResult<i64> {
        let dialect = self.writer().await?;
        let cleaned = self.cleanup(dialect).await?;
        if cleaned > 0 {
            info!(cleaned, "rollback states reconciled");
        }
        Ok(cleaned)
    }

    async fn cleanup(&self, dialect: &Dialect) -> ExecutorResult<i64> {
        let statement = dialect.render(&RollbackCommand::CleanupState.into());
        Ok(self.select_int(&statement, "nb_cleaned").await?.unwrap_or(0))
    }

    /// Estimates the volume and duration of rolling `group` back to `mark`.
    ///
    /// # Errors
    ///
    /// See [`RollbackOrchestrator::in_progress`].
    pub async fn estimate(
        &self,
        group: &GroupName,
        mark: &MarkName,
    ) -> RollbackResult<RollbackEstimate> {
        let dialect = self.reader().await?;
        let rows = self
            .select(
                dialect,
                StatOperation::GlobalRollback {
                    group: group.clone(),
                    mark: mark.clone(),
                },
            )
            .await?;
        let (rows_to_revert, tables) = match rows.first() {
            Some(row) => (
                row.opt_int("sum_rows")?.unwrap_or(0),
                row.opt_int("nb_tables")?.unwrap_or(0),
            ),
            None => (0, 0),
        };
        let estimate = dialect.render(
            &StatOperation::EstimateRollback {
                group: group.clone(),
                mark: mark.clone(),
            }
            .into(),
        );
        let duration = match self
            .session
            .executor()
            .select_field(&estimate, "duration")
            .await?
        {
            Some(field) => field.opt_text()?,
            None => None,
        };
        Ok(RollbackEstimate {
            rows: rows_to_revert,
            tables,
            duration,
        })
    }

    /// Lists the marks the selected groups can be rolled back to.
    ///
    /// # Errors
    ///
    /// Returns [`RollbackError::Catalog`] when the catalog read fails.
    pub async fn rollback_marks(
        &self,
        groups: &GroupSelection,
    ) -> RollbackResult<Vec<RollbackTargetMark>> {
        Ok(self.catalog.rollback_target_marks(groups).await?)
    }
}
