//! Catalog access service.
//!
//! [`CatalogService`] exposes one method per administrative operation over
//! groups, marks, the group definition and log statistics. Every method
//! renders its statement through the session dialect and re-reads the state
//! it depends on before mutating.

mod decode;
mod definition;
mod error;
mod groups;
mod marks;
mod service;
mod stats;

pub use error::{CatalogError, CatalogResult};
pub use groups::UNAVAILABLE;
pub use service::CatalogService;
