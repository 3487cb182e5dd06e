//! Rollback orchestration.
//!
//! Rollbacks run either synchronously through the extension's rollback
//! functions or asynchronously in a detached command-line client. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - The process launch port in [`ports`]
//! - Launcher adapters in [`adapters`]
//! - The orchestrator in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

pub use services::{RollbackError, RollbackOrchestrator, RollbackResult};
