//! Capability prober and version resolver.
//!
//! An [`EmajSession`] is the explicit context passed to every other
//! component. It answers "is the extension installed", "who may use it" and
//! "which version is it" once per session and keeps the first answer.
//!
//! - Version, identity and snapshot types in [`domain`]
//! - The compute-once session context in [`services`]

pub mod domain;
pub mod services;

pub use domain::{AccessError, CapabilitySnapshot, ExtensionVersion, ServerIdentity};
pub use services::EmajSession;
