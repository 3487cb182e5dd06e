//! E-Maj gateway: version-adaptive administration of the E-Maj extension.
//!
//! This crate sits between an administrative front end and the database
//! extension that records table changes and rolls table groups back to
//! marks. It detects which release of the extension is installed, rewrites
//! every logical operation into the statement that release understands,
//! gates mutations on the caller's extension role, and drives rollbacks
//! synchronously or through a detached command-line client.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure values and state machines with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for statement execution and process
//!   launching
//! - **Adapters**: Concrete implementations of ports (Diesel, in-memory,
//!   platform shell)
//!
//! # Modules
//!
//! - [`dialect`]: Per-version statement rendering
//! - [`database`]: Statement execution port and adapters
//! - [`session`]: Capability probes and version resolution
//! - [`catalog`]: Groups, marks, group definition and log statistics
//! - [`rollback`]: Synchronous and asynchronous rollback orchestration
//! - [`config`]: Gateway configuration
//! - [`shell`]: Command-line quoting for the detached client

pub mod catalog;
pub mod config;
pub mod database;
pub mod dialect;
pub mod rollback;
pub mod session;
pub mod shell;
