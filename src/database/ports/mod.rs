//! Port contracts for statement execution.

mod executor;
mod row;

pub use executor::{ExecutorError, ExecutorResult, QueryExecutor};
pub use row::{Field, Row};
