//! Catalog service shell shared by the per-area operation files.

use std::sync::Arc;

use tracing::warn;

use super::error::CatalogResult;
use crate::database::ports::{Field, QueryExecutor, Row};
use crate::dialect::{Dialect, Operation, Statement};
use crate::session::EmajSession;

/// Logical read/write operations over the extension catalog.
///
/// Reads require viewer access and mutations administrator access; both are
/// checked through the shared [`EmajSession`] before any statement is
/// rendered.
pub struct CatalogService<E> {
    session: Arc<EmajSession<E>>,
}

impl<E> Clone for CatalogService<E> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<E: QueryExecutor> CatalogService<E> {
    /// Creates a service over `session`.
    #[must_use]
    pub const fn new(session: Arc<EmajSession<E>>) -> Self {
        Self { session }
    }

    /// Returns the underlying session.
    #[must_use]
    pub const fn session(&self) -> &Arc<EmajSession<E>> {
        &self.session
    }

    /// Checks viewer access and returns the dialect.
    pub(super) async fn reader(&self) -> CatalogResult<&Dialect> {
        self.session.ensure_accessible().await?;
        Ok(self.session.dialect().await)
    }

    /// Checks administrator access and returns the dialect.
    pub(super) async fn writer(&self) -> CatalogResult<&Dialect> {
        self.session.ensure_admin().await?;
        Ok(self.session.dialect().await)
    }

    pub(super) async fn select(
        &self,
        dialect: &Dialect,
        operation: impl Into<Operation> + Send,
    ) -> CatalogResult<Vec<Row>> {
        let statement = render(dialect, operation);
        Ok(self.session.executor().select_set(&statement).await?)
    }

    pub(super) async fn scalar(
        &self,
        dialect: &Dialect,
        operation: impl Into<Operation> + Send,
        column: &str,
    ) -> CatalogResult<Option<Field>> {
        let statement = render(dialect, operation);
        Ok(self
            .session
            .executor()
            .select_field(&statement, column)
            .await?)
    }

    /// Reads an integer column, `0` when the query returns no row or NULL.
    pub(super) async fn count(
        &self,
        dialect: &Dialect,
        operation: impl Into<Operation> + Send,
        column: &str,
    ) -> CatalogResult<i64> {
        match self.scalar(dialect, operation, column).await? {
            Some(field) => Ok(field.opt_int()?.unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Reads a boolean column, `false` when the query returns no row.
    pub(super) async fn flag(
        &self,
        dialect: &Dialect,
        operation: impl Into<Operation> + Send,
        column: &str,
    ) -> CatalogResult<bool> {
        match self.scalar(dialect, operation, column).await? {
            Some(field) if !field.is_null() => Ok(field.flag()?),
            _ => Ok(false),
        }
    }

    pub(super) async fn execute(
        &self,
        dialect: &Dialect,
        operation: impl Into<Operation> + Send,
    ) -> CatalogResult<u64> {
        let statement = render(dialect, operation);
        Ok(self.session.executor().execute(&statement).await?)
    }

    /// Rolls the open transaction back, logging a failure instead of
    /// returning it so the original error reaches the caller.
    pub(super) async fn abort_transaction(&self) {
        if let Err(err) = self.session.executor().rollback_transaction().await {
            warn!(error = %err, "transaction rollback failed");
        }
    }
}

fn render(dialect: &Dialect, operation: impl Into<Operation>) -> Statement {
    dialect.render(&operation.into())
}
