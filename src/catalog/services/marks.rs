//! Mark operations.

use tracing::info;

use super::decode;
use super::error::CatalogResult;
use super::service::CatalogService;
use crate::catalog::domain::{
    GroupName, GroupSelection, Mark, MarkName, RollbackTargetMark, StalePrecondition,
    accumulate_log_rows,
};
use crate::database::ports::QueryExecutor;
use crate::dialect::{Dialect, MarkOperation};

impl<E: QueryExecutor> CatalogService<E> {
    /// Lists the marks of a group, newest first, with cumulative log rows.
    ///
    /// # Errors
    ///
    /// Returns [`super::CatalogError`] when access is denied or the query
    /// fails.
    pub async fn list_marks(&self, group: &GroupName) -> CatalogResult<Vec<Mark>> {
        let dialect = self.reader().await?;
        let rows = self
            .select(dialect, MarkOperation::List { group: group.clone() })
            .await?;
        let mut marks = decode::all(&rows, decode::mark)?;
        accumulate_log_rows(&mut marks);
        Ok(marks)
    }

    /// Returns one mark, `None` when the group has no such mark.
    ///
    /// The cumulative row count is not computed for a single mark.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_marks`].
    pub async fn get_mark(&self, group: &GroupName, mark: &MarkName) -> CatalogResult<Option<Mark>> {
        let dialect = self.reader().await?;
        self.find_mark(dialect, group, mark).await
    }

    async fn find_mark(
        &self,
        dialect: &Dialect,
        group: &GroupName,
        mark: &MarkName,
    ) -> CatalogResult<Option<Mark>> {
        let rows = self
            .select(
                dialect,
                MarkOperation::Get {
                    group: group.clone(),
                    mark: mark.clone(),
                },
            )
            .await?;
        Ok(rows.first().map(decode::mark).transpose()?)
    }

    async fn require_mark(
        &self,
        dialect: &Dialect,
        group: &GroupName,
        mark: &MarkName,
    ) -> CatalogResult<Mark> {
        self.find_mark(dialect, group, mark).await?.ok_or_else(|| {
            StalePrecondition::UnknownMark {
                group: group.as_str().to_owned(),
                mark: mark.as_str().to_owned(),
            }
            .into()
        })
    }

    /// Reports whether `mark` is free in every selected group.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_marks`].
    pub async fn is_new_mark_valid(
        &self,
        groups: &GroupSelection,
        mark: &MarkName,
    ) -> CatalogResult<bool> {
        let dialect = self.reader().await?;
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
        Ok(existing == 0)
    }

    /// Counts the marks of a group that can still be rollback targets.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_marks`].
    pub async fn count_active_marks(&self, group: &GroupName) -> CatalogResult<i64> {
        let dialect = self.reader().await?;
        self.count(
            dialect,
            MarkOperation::CountActive { group: group.clone() },
            "mark_count",
        )
        .await
    }

    /// Reports whether `mark` is the oldest mark of its group.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_marks`].
    pub async fn is_first_mark(&self, group: &GroupName, mark: &MarkName) -> CatalogResult<bool> {
        let dialect = self.reader().await?;
        self.flag(
            dialect,
            MarkOperation::IsFirst {
                group: group.clone(),
                mark: mark.clone(),
            },
            "is_first",
        )
        .await
    }

    /// Sets a mark on logging groups and returns the number of tables and
    /// sequences processed.
    ///
    /// # Errors
    ///
    /// Returns [`super::CatalogError::StalePrecondition`] when a group is
    /// idle or the name is taken, [`super::CatalogError::Access`] for
    /// non-administrators, and [`super::CatalogError::Executor`] when the
    /// extension rejects the mark.
    pub async fn set_mark(&self, groups: &GroupSelection, mark: &MarkName) -> CatalogResult<i64> {
        let dialect = self.writer().await?;
        self.require_logging_state(dialect, groups, true).await?;
        self.require_new_mark(dialect, groups, mark).await?;
        let count = self
            .count(
                dialect,
                MarkOperation::Set {
                    groups: groups.clone(),
                    mark: mark.clone(),
                },
                "nbtblseq",
            )
            .await?;
        info!(groups = %groups, mark = %mark, tblseq = count, "mark set");
        Ok(count)
    }

    /// Sets or clears the comment of a mark.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::set_mark`].
    pub async fn comment_mark(
        &self,
        group: &GroupName,
        mark: &MarkName,
        comment: Option<&str>,
    ) -> CatalogResult<()> {
        let dialect = self.writer().await?;
        self.select(
            dialect,
            MarkOperation::Comment {
                group: group.clone(),
                mark: mark.clone(),
                comment: comment.map(str::to_owned),
            },
        )
        .await?;
        info!(group = %group, mark = %mark, "mark comment set");
        Ok(())
    }

    /// Deletes one mark of a group.
    ///
    /// # Errors
    ///
    /// Returns [`super::CatalogError::StalePrecondition`] when the mark no
    /// longer exists, or any error of [`CatalogService::set_mark`].
    pub async fn delete_mark(&self, group: &GroupName, mark: &MarkName) -> CatalogResult<()> {
        let dialect = self.writer().await?;
        self.require_mark(dialect, group, mark).await?;
        self.select(
            dialect,
            MarkOperation::Delete {
                group: group.clone(),
                mark: mark.clone(),
            },
        )
        .await?;
        info!(group = %group, mark = %mark, "mark deleted");
        Ok(())
    }

    /// Deletes every mark older than `mark` and returns how many were
    /// deleted.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::delete_mark`].
    pub async fn delete_marks_before(
        &self,
        group: &GroupName,
        mark: &MarkName,
    ) -> CatalogResult<i64> {
        let dialect = self.writer().await?;
        self.require_mark(dialect, group, mark).await?;
        let deleted = self
            .count(
                dialect,
                MarkOperation::DeleteBefore {
                    group: group.clone(),
                    mark: mark.clone(),
                },
                "nb_mark",
            )
            .await?;
        info!(group = %group, mark = %mark, deleted, "marks deleted");
        Ok(deleted)
    }

    /// Renames a mark.
    ///
    /// # Errors
    ///
    /// Returns [`super::CatalogError::StalePrecondition`] when the mark no
    /// longer exists or the new name is taken, or any error of
    /// [`CatalogService::set_mark`].
    pub async fn rename_mark(
        &self,
        group: &GroupName,
        mark: &MarkName,
        new_name: &MarkName,
    ) -> CatalogResult<()> {
        let dialect = self.writer().await?;
        self.require_mark(dialect, group, mark).await?;
        self.require_new_mark(dialect, &GroupSelection::single(group.clone()), new_name)
            .await?;
        self.select(
            dialect,
            MarkOperation::Rename {
                group: group.clone(),
                mark: mark.clone(),
                new_name: new_name.clone(),
            },
        )
        .await?;
        info!(group = %group, mark = %mark, new_name = %new_name, "mark renamed");
        Ok(())
    }

    /// Lists the marks usable as rollback targets: the active marks of a
    /// single group, or the active marks common to several rollbackable
    /// groups.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_marks`].
    pub async fn rollback_target_marks(
        &self,
        groups: &GroupSelection,
    ) -> CatalogResult<Vec<RollbackTargetMark>> {
        let dialect = self.reader().await?;
        let rows = self
            .select(
                dialect,
                MarkOperation::RollbackTargets {
                    groups: groups.clone(),
                },
            )
            .await?;
        Ok(decode::all(&rows, decode::rollback_target)?)
    }

    /// Reports whether `mark` is an active mark of every selected
    /// rollbackable group.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::list_marks`].
    pub async fn is_rollback_mark_valid(
        &self,
        groups: &GroupSelection,
        mark: &MarkName,
    ) -> CatalogResult<bool> {
        let dialect = self.reader().await?;
        let matching = self
            .count(
                dialect,
                MarkOperation::CountRollbackTargets {
                    groups: groups.clone(),
                    mark: mark.clone(),
                },
                "mark_count",
            )
            .await?;
        Ok(usize::try_from(matching).is_ok_and(|count| count == groups.len()))
    }
}
