//! Table group operations.

use tracing::info;

use super::decode;
use super::error::CatalogResult;
use super::service::CatalogService;
use crate::catalog::domain::{
    GroupDetail, GroupName, GroupRelation, GroupSelection, GroupState, GroupSummary, MarkName,
    StalePrecondition, TableGroup,
};
use crate::database::ports::QueryExecutor;
use crate::dialect::{Dialect, GroupOperation, MarkOperation};

/// Placeholder reported for values the principal may not see.
pub const UNAVAILABLE: &str = "?";

impl<E: QueryExecutor> CatalogService<E> {
    /// Lists every created group with its comment.
    ///
    /// # Errors
    ///
    /// Returns [`super::CatalogError`] when access is denied or the query
    /// fails.
    pub async fn list_groups(&self) -> CatalogResult<Vec<GroupSummary>> {
        let dialect = self.reader().await?;
        let rows = self.select(dialect, GroupOperation::List).await?;
        Ok(decode::all(&rows, decode::group_summary)?)
    }

    /// Lists groups that are not recording changes.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_groups`].
    pub async fn list_idle_groups(&self) -> CatalogResult<Vec<TableGroup>> {
        let dialect = self.reader().await?;
        let rows = self.select(dialect, GroupOperation::ListIdle).await?;
        Ok(decode::all(&rows, decode::table_group)?)
    }

    /// Lists groups that are recording changes.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_groups`].
    pub async fn list_logging_groups(&self) -> CatalogResult<Vec<TableGroup>> {
        let dialect = self.reader().await?;
        let rows = self.select(dialect, GroupOperation::ListLogging).await?;
        Ok(decode::all(&rows, decode::table_group)?)
    }

    /// Lists group names present in the group definition but not created.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_groups`].
    pub async fn list_new_groups(&self) -> CatalogResult<Vec<String>> {
        let dialect = self.reader().await?;
        let rows = self.select(dialect, GroupOperation::ListNew).await?;
        Ok(decode::all(&rows, decode::group_name)?)
    }

    /// Returns one group with its total log size, `None` when it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_groups`].
    pub async fn get_group(&self, group: &GroupName) -> CatalogResult<Option<GroupDetail>> {
        let dialect = self.reader().await?;
        let rows = self
            .select(dialect, GroupOperation::Get { group: group.clone() })
            .await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        Ok(Some(GroupDetail {
            group: decode::table_group(row)?,
            log_size: row.opt_text("log_size")?,
        }))
    }

    /// Returns the type and logging state of each selected group that exists.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_groups`].
    pub async fn group_states(&self, groups: &GroupSelection) -> CatalogResult<Vec<GroupState>> {
        let dialect = self.reader().await?;
        self.states(dialect, groups).await
    }

    async fn states(
        &self,
        dialect: &Dialect,
        groups: &GroupSelection,
    ) -> CatalogResult<Vec<GroupState>> {
        let rows = self
            .select(dialect, GroupOperation::States { groups: groups.clone() })
            .await?;
        Ok(decode::all(&rows, decode::group_state)?)
    }

    /// Fails unless every selected group exists and is in the requested
    /// logging state.
    pub(super) async fn require_logging_state(
        &self,
        dialect: &Dialect,
        groups: &GroupSelection,
        logging: bool,
    ) -> CatalogResult<Vec<GroupState>> {
        let states = self.states(dialect, groups).await?;
        if let Some(missing) = groups
            .groups()
            .iter()
            .find(|group| !states.iter().any(|state| state.name == group.as_str()))
        {
            return Err(StalePrecondition::UnknownGroup(missing.as_str().to_owned()).into());
        }
        let mismatched: Vec<String> = states
            .iter()
            .filter(|state| state.is_logging != logging)
            .map(|state| state.name.clone())
            .collect();
        if mismatched.is_empty() {
            Ok(states)
        } else if logging {
            Err(StalePrecondition::GroupsNotLogging(mismatched).into())
        } else {
            Err(StalePrecondition::GroupsNotIdle(mismatched).into())
        }
    }

    /// Fails when `mark` already names a mark of one of the groups.
    pub(super) async fn require_new_mark(
        &self,
        dialect: &Dialect,
        groups: &GroupSelection,
        mark: &MarkName,
    ) -> CatalogResult<()> {
        let existing = self
            .count(
                dialect,
                MarkOperation::CountNamed {
                    groups: groups.clone(),
                    mark: mark.clone(),
                },
                "mark_count",
            )
            .await?;
        if existing == 0 {
            Ok(())
        } else {
            Err(StalePrecondition::MarkAlreadyExists(mark.as_str().to_owned()).into())
        }
    }

    /// Reports whether a group can be rolled back; unknown groups cannot.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_groups`].
    pub async fn is_group_rollbackable(&self, group: &GroupName) -> CatalogResult<bool> {
        let dialect = self.reader().await?;
        self.flag(
            dialect,
            GroupOperation::IsRollbackable { group: group.clone() },
            "is_rollbackable",
        )
        .await
    }

    /// Lists the tables and sequences of a created group.
    ///
    /// Attributes the installed version does not record are `None`.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_groups`].
    pub async fn group_content(&self, group: &GroupName) -> CatalogResult<Vec<GroupRelation>> {
        let dialect = self.reader().await?;
        let rows = self
            .select(dialect, GroupOperation::Content { group: group.clone() })
            .await?;
        Ok(decode::all(&rows, decode::group_relation)?)
    }

    async fn group_function(
        &self,
        dialect: &Dialect,
        operation: GroupOperation,
    ) -> CatalogResult<i64> {
        self.count(dialect, operation, "nbtblseq").await
    }

    /// Creates a group from its definition and returns the number of tables
    /// and sequences it contains.
    ///
    /// # Errors
    ///
    /// Returns [`super::CatalogError::Access`] for non-administrators and
    /// [`super::CatalogError::Executor`] when the extension rejects the
    /// creation.
    pub async fn create_group(&self, group: &GroupName, is_rollbackable: bool) -> CatalogResult<i64> {
        let dialect = self.writer().await?;
        let count = self
            .group_function(
                dialect,
                GroupOperation::Create {
                    group: group.clone(),
                    is_rollbackable,
                },
            )
            .await?;
        info!(group = %group, is_rollbackable, tblseq = count, "table group created");
        Ok(count)
    }

    /// Drops an idle group.
    ///
    /// # Errors
    ///
    /// Returns [`super::CatalogError::StalePrecondition`] when the group is
    /// logging or missing, or any error of [`CatalogService::create_group`].
    pub async fn drop_group(&self, group: &GroupName) -> CatalogResult<i64> {
        let dialect = self.writer().await?;
        self.require_logging_state(dialect, &GroupSelection::single(group.clone()), false)
            .await?;
        let count = self
            .group_function(dialect, GroupOperation::Drop { group: group.clone() })
            .await?;
        info!(group = %group, tblseq = count, "table group dropped");
        Ok(count)
    }

    /// Re-applies the group definition to a created group.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::create_group`].
    pub async fn alter_group(&self, group: &GroupName) -> CatalogResult<i64> {
        let dialect = self.writer().await?;
        let count = self
            .group_function(dialect, GroupOperation::Alter { group: group.clone() })
            .await?;
        info!(group = %group, tblseq = count, "table group altered");
        Ok(count)
    }

    /// Sets or clears the comment of a group.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::create_group`].
    pub async fn comment_group(&self, group: &GroupName, comment: Option<&str>) -> CatalogResult<()> {
        let dialect = self.writer().await?;
        self.select(
            dialect,
            GroupOperation::Comment {
                group: group.clone(),
                comment: comment.map(str::to_owned),
            },
        )
        .await?;
        info!(group = %group, "table group comment set");
        Ok(())
    }

    /// Starts idle groups, setting `mark` as their first mark.
    ///
    /// Without a log reset the existing marks are kept, so `mark` must not
    /// already exist in any of the groups.
    ///
    /// # Errors
    ///
    /// Returns [`super::CatalogError::StalePrecondition`] when a group is
    /// already logging or the mark name is taken, or any error of
    /// [`CatalogService::create_group`].
    pub async fn start_groups(
        &self,
        groups: &GroupSelection,
        mark: &MarkName,
        reset_log: bool,
    ) -> CatalogResult<i64> {
        let dialect = self.writer().await?;
        self.require_logging_state(dialect, groups, false).await?;
        if !reset_log {
            self.require_new_mark(dialect, groups, mark).await?;
        }
        let count = self
            .group_function(
                dialect,
                GroupOperation::Start {
                    groups: groups.clone(),
                    mark: mark.clone(),
                    reset_log,
                },
            )
            .await?;
        info!(groups = %groups, mark = %mark, reset_log, tblseq = count, "table groups started");
        Ok(count)
    }

    /// Stops logging groups, optionally setting a final mark.
    ///
    /// # Errors
    ///
    /// Returns [`super::CatalogError::StalePrecondition`] when a group is
    /// already idle or the final mark name is taken, or any error of
    /// [`CatalogService::create_group`].
    pub async fn stop_groups(
        &self,
        groups: &GroupSelection,
        mark: Option<&MarkName>,
    ) -> CatalogResult<i64> {
        let dialect = self.writer().await?;
        self.require_logging_state(dialect, groups, true).await?;
        if let Some(final_mark) = mark {
            self.require_new_mark(dialect, groups, final_mark).await?;
        }
        let count = self
            .group_function(
                dialect,
                GroupOperation::Stop {
                    groups: groups.clone(),
                    mark: mark.cloned(),
                },
            )
            .await?;
        info!(groups = %groups, tblseq = count, "table groups stopped");
        Ok(count)
    }

    /// Stops a group whatever its state, for damaged groups.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::create_group`].
    pub async fn force_stop_group(&self, group: &GroupName) -> CatalogResult<i64> {
        let dialect = self.writer().await?;
        let count = self
            .group_function(dialect, GroupOperation::ForceStop { group: group.clone() })
            .await?;
        info!(group = %group, tblseq = count, "table group force-stopped");
        Ok(count)
    }

    /// Purges the logs and marks of an idle group.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::drop_group`].
    pub async fn reset_group(&self, group: &GroupName) -> CatalogResult<i64> {
        let dialect = self.writer().await?;
        self.require_logging_state(dialect, &GroupSelection::single(group.clone()), false)
            .await?;
        let count = self
            .group_function(dialect, GroupOperation::Reset { group: group.clone() })
            .await?;
        info!(group = %group, tblseq = count, "table group reset");
        Ok(count)
    }

    /// Returns the disk footprint of the extension with its share of the
    /// database, or `"?"` for principals that are not administrators.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_groups`].
    pub async fn extension_size(&self) -> CatalogResult<String> {
        let dialect = self.reader().await?;
        if !self.session().probe_admin().await {
            return Ok(UNAVAILABLE.to_owned());
        }
        match self
            .scalar(dialect, GroupOperation::ExtensionSize, "emaj_size")
            .await?
        {
            Some(field) => Ok(field.opt_text()?.unwrap_or_else(|| UNAVAILABLE.to_owned())),
            None => Ok(UNAVAILABLE.to_owned()),
        }
    }

    /// Runs the extension's consistency check and returns its messages.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_groups`].
    pub async fn verify_all(&self) -> CatalogResult<Vec<String>> {
        let dialect = self.reader().await?;
        let rows = self.select(dialect, GroupOperation::VerifyAll).await?;
        Ok(rows
            .iter()
            .map(|row| row.text("message"))
            .collect::<Result<_, _>>()?)
    }
}
