//! Implementations of the [`crate::database::ports::QueryExecutor`] port.

pub mod memory;
pub mod postgres;

pub use memory::{JournalEntry, Reply, ScriptedExecutor};
pub use postgres::{PgPool, PooledConn, PostgresExecutor};
