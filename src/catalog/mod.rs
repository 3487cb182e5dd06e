//! Catalog access over the extension's groups, marks and group definition.
//!
//! The extension owns its metadata; this module maps logical operations onto
//! the extension's tables and functions:
//!
//! - Domain types in [`domain`]
//! - The catalog service in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;

pub use services::{CatalogError, CatalogResult, CatalogService};
