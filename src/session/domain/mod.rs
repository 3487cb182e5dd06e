//! Session-scoped facts: installed version, capabilities and identity.

mod capability;
mod error;
mod identity;
mod version;

pub use capability::CapabilitySnapshot;
pub use error::AccessError;
pub use identity::ServerIdentity;
pub use version::{ExtensionVersion, UNKNOWN_VERSION};
