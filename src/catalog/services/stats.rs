//! Log statistics.

use super::decode;
use super::error::CatalogResult;
use super::service::CatalogService;
use crate::catalog::domain::{
    DetailedLogStatReport, DetailedLogStatSummary, GroupName, LogStatReport, LogStatSummary,
    MarkName,
};
use crate::database::ports::QueryExecutor;
use crate::dialect::StatOperation;

impl<E: QueryExecutor> CatalogService<E> {
    /// Returns per-table log row counts between two marks, or since
    /// `first_mark` when `last_mark` is `None`, with the query selecting each
    /// table's log rows.
    ///
    /// # Errors
    ///
    /// Returns [`super::CatalogError`] when access is denied or the query
    /// fails.
    pub async fn log_stats(
        &self,
        group: &GroupName,
        first_mark: &MarkName,
        last_mark: Option<&MarkName>,
    ) -> CatalogResult<LogStatReport> {
        let dialect = self.reader().await?;
        let rows = self
            .select(
                dialect,
                StatOperation::Log {
                    group: group.clone(),
                    first_mark: first_mark.clone(),
                    last_mark: last_mark.cloned(),
                },
            )
            .await?;
        let entries = decode::all(&rows, decode::log_stat)?;
        let summary = LogStatSummary::from_entries(&entries);
        Ok(LogStatReport { entries, summary })
    }

    /// Returns log row counts per table, role and verb.
    ///
    /// # Errors
    ///
    /// See [`CatalogService::log_stats`].
    pub async fn detailed_log_stats(
        &self,
        group: &GroupName,
        first_mark: &MarkName,
        last_mark: Option<&MarkName>,
    ) -> CatalogResult<DetailedLogStatReport> {
        let dialect = self.reader().await?;
        let rows = self
            .select(
                dialect,
                StatOperation::DetailedLog {
                    group: group.clone(),
                    first_mark: first_mark.clone(),
                    last_mark: last_mark.cloned(),
                },
            )
            .await?;
        let entries = decode::all(&rows, decode::detailed_log_stat)?;
        let summary = DetailedLogStatSummary::from_entries(&entries);
        Ok(DetailedLogStatReport { entries, summary })
    }
}
