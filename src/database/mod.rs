//! Query/execute interface consumed by every other component.
//!
//! The gateway does not own a connection pool or a result-set model; it sends
//! rendered [`crate::dialect::Statement`]s through the [`ports::QueryExecutor`]
//! port and reads rows back as column-name maps.
//!
//! - Port contract and row decoding in [`ports`]
//! - Diesel and scripted in-memory implementations in [`adapters`]

pub mod adapters;
pub mod ports;
