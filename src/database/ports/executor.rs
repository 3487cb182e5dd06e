//! Statement execution port.

use super::{Field, Row};
use crate::dialect::Statement;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for statement execution.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Narrow query/execute contract over one database session.
///
/// Implementations keep a single backend session for their whole lifetime so
/// that explicit transactions and session state behave as expected.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs a query and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the statement fails or a row cannot be
    /// decoded.
    async fn select_set(&self, statement: &Statement) -> ExecutorResult<Vec<Row>>;

    /// Runs a query and returns `field` of its first row, `None` when the
    /// query returns no row.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::MissingColumn`] when the first row has no
    /// such column, or any error of [`QueryExecutor::select_set`].
    async fn select_field(
        &self,
        statement: &Statement,
        field: &str,
    ) -> ExecutorResult<Option<Field>> {
        let rows = self.select_set(statement).await?;
        rows.into_iter()
            .next()
            .map(|row| row.into_field(field))
            .transpose()
    }

    /// Runs a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the statement fails.
    async fn execute(&self, statement: &Statement) -> ExecutorResult<u64>;

    /// Opens an explicit transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the transaction cannot be opened.
    async fn begin_transaction(&self) -> ExecutorResult<()>;

    /// Rolls the open transaction back.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the rollback fails.
    async fn rollback_transaction(&self) -> ExecutorResult<()>;

    /// Commits the open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the commit fails.
    async fn end_transaction(&self) -> ExecutorResult<()>;
}

/// Errors returned by [`QueryExecutor`] implementations.
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    /// The database rejected the statement.
    #[error("database error: {0}")]
    Database(Arc<dyn std::error::Error + Send + Sync>),

    /// The session could not be obtained or used.
    #[error("connection error: {0}")]
    Connection(String),

    /// A column holds a value of an unexpected shape.
    #[error("cannot decode column {column}: {reason}")]
    Decode {
        /// Column name.
        column: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// A column expected by the caller is absent from the row.
    #[error("column {0} is missing from the result")]
    MissingColumn(String),
}

impl ExecutorError {
    /// Wraps a database failure.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Arc::new(err))
    }

    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Creates a decoding error for `column`.
    pub fn decode(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            reason: reason.into(),
        }
    }
}
