//! Port contracts for launching the external client of asynchronous
//! rollbacks.

mod launcher;

pub use launcher::{LaunchError, LaunchResult, LaunchSpec, ProcessLauncher};

#[cfg(test)]
pub use launcher::MockProcessLauncher;
