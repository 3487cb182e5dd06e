//! Access errors raised before catalog operations run.

use thiserror::Error;

/// The extension cannot be used by the current principal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// No schema of the configured name exists.
    #[error("the extension is not installed in schema {schema}")]
    ExtensionNotInstalled {
        /// Schema that was looked up.
        schema: String,
    },

    /// The principal is neither administrator nor viewer.
    #[error("the current role is not allowed to use the extension")]
    NotAccessible,

    /// A mutating operation was requested by a viewer.
    #[error("the operation requires the extension administrator role")]
    AdminRequired,
}
