//! Per-session capability snapshot.

use serde::{Deserialize, Serialize};

/// What the current principal may do with the extension in this session.
///
/// Built from the memoized probes of [`crate::session::EmajSession`], so two
/// snapshots of the same session are always equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySnapshot {
    /// Whether the extension schema exists.
    pub installed: bool,
    /// Actual extension schema name.
    pub schema_name: String,
    /// Whether the principal administers the extension.
    pub is_admin: bool,
    /// Whether the principal may read the extension catalog.
    pub is_viewer: bool,
    /// Whether cross-session links can be opened for parallel rollbacks.
    pub cross_link_usable: bool,
    /// Whether asynchronous rollbacks can be submitted.
    pub async_usable: bool,
}

impl CapabilitySnapshot {
    /// Returns `true` when the extension is installed and readable by the
    /// principal.
    #[must_use]
    pub const fn is_accessible(&self) -> bool {
        self.installed && (self.is_admin || self.is_viewer)
    }
}
