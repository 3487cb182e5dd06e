//! Rollback orchestration service.

mod decode;
mod error;
mod orchestrator;

pub use error::{RollbackError, RollbackResult};
pub use orchestrator::RollbackOrchestrator;
