//! Adapter implementations for the process launch port.

mod detached;
mod memory;

pub use detached::DetachedProcessLauncher;
pub use memory::RecordingLauncher;
