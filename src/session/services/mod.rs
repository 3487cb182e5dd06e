//! Session services: capability probes and version resolution.

mod client_probe;
mod context;

#[cfg(test)]
mod context_tests;

pub use context::EmajSession;
