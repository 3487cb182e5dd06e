//! Diesel-backed implementation of the [`QueryExecutor`] port.
//!
//! Statements are sent through a boxed [`diesel::sql_query`] with their
//! parameters bound in order. Arbitrary result shapes are decoded by wrapping
//! every select in `row_to_json`, so no per-query row model is needed.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sql_types::{Array, BigInt, Bool, Integer, Nullable, Text};
use tracing::debug;

use crate::database::ports::{ExecutorError, ExecutorResult, QueryExecutor, Row};
use crate::dialect::{SqlParam, Statement};

/// `PostgreSQL` connection pool type.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Pooled connection type.
pub type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

#[derive(QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = Text)]
    row_json: String,
}

/// [`QueryExecutor`] holding one pooled connection for the whole
/// administrative session.
///
/// Explicit transactions and session-scoped helpers (such as cross-session
/// links) need every statement to reach the same backend, so the connection
/// is checked out once and kept until the executor is dropped.
#[derive(Clone)]
pub struct PostgresExecutor {
    connection: Arc<Mutex<PooledConn>>,
}

impl PostgresExecutor {
    /// Wraps an already checked-out connection.
    #[must_use]
    pub fn new(connection: PooledConn) -> Self {
        Self {
            connection: Arc::new(Mutex::new(connection)),
        }
    }

    /// Checks a connection out of `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Connection`] when the pool cannot provide a
    /// connection.
    pub fn from_pool(pool: &PgPool) -> ExecutorResult<Self> {
        pool.get()
            .map(Self::new)
            .map_err(|err| ExecutorError::connection(err.to_string()))
    }

    /// Runs `operation` against the session connection on the blocking pool.
    async fn run_blocking<F, T>(&self, operation: F) -> ExecutorResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ExecutorResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut guard = connection
                .lock()
                .map_err(|_| ExecutorError::connection("session connection lock poisoned"))?;
            operation(&mut guard)
        })
        .await
        .map_err(|err| ExecutorError::connection(format!("task join error: {err}")))?
    }

    async fn batch(&self, command: &'static str) -> ExecutorResult<()> {
        debug!(command, "transaction control");
        self.run_blocking(move |conn| conn.batch_execute(command).map_err(ExecutorError::database))
            .await
    }
}

/// Wraps a select so each row comes back as one JSON object.
fn wrap_as_json(sql: &str) -> String {
    format!("SELECT row_to_json(q)::text AS row_json FROM ({sql}) AS q")
}

/// Builds a boxed query with `params` bound in placeholder order.
fn bind_all(sql: String, params: Vec<SqlParam>) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    params
        .into_iter()
        .fold(diesel::sql_query(sql).into_boxed::<Pg>(), |query, param| {
            match param {
                SqlParam::Text(value) => query.bind::<Text, _>(value),
                SqlParam::NullableText(value) => query.bind::<Nullable<Text>, _>(value),
                SqlParam::Bool(value) => query.bind::<Bool, _>(value),
                SqlParam::Int(value) => query.bind::<Integer, _>(value),
                SqlParam::NullableInt(value) => query.bind::<Nullable<Integer>, _>(value),
                SqlParam::BigInt(value) => query.bind::<BigInt, _>(value),
                SqlParam::TextArray(value) => query.bind::<Array<Text>, _>(value),
            }
        })
}

#[async_trait]
impl QueryExecutor for PostgresExecutor {
    async fn select_set(&self, statement: &Statement) -> ExecutorResult<Vec<Row>> {
        debug!(
            sql = statement.sql(),
            params = statement.params().len(),
            "select"
        );
        let (sql, params) = statement.clone().into_parts();
        let json_rows = self
            .run_blocking(move |conn| {
                bind_all(wrap_as_json(&sql), params)
                    .load::<JsonRow>(conn)
                    .map_err(ExecutorError::database)
            })
            .await?;
        json_rows
            .iter()
            .map(|row| Row::from_json(&row.row_json))
            .collect()
    }

    async fn execute(&self, statement: &Statement) -> ExecutorResult<u64> {
        debug!(
            sql = statement.sql(),
            params = statement.params().len(),
            "execute"
        );
        let (sql, params) = statement.clone().into_parts();
        let affected = self
            .run_blocking(move |conn| {
                bind_all(sql, params)
                    .execute(conn)
                    .map_err(ExecutorError::database)
            })
            .await?;
        u64::try_from(affected).map_err(|err| ExecutorError::decode("affected_rows", err.to_string()))
    }

    async fn begin_transaction(&self) -> ExecutorResult<()> {
        self.batch("BEGIN").await
    }

    async fn rollback_transaction(&self) -> ExecutorResult<()> {
        self.batch("ROLLBACK").await
    }

    async fn end_transaction(&self) -> ExecutorResult<()> {
        self.batch("COMMIT").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_are_wrapped_into_json_rows() {
        assert_eq!(
            wrap_as_json("SELECT 1 AS one"),
            "SELECT row_to_json(q)::text AS row_json FROM (SELECT 1 AS one) AS q"
        );
    }
}
