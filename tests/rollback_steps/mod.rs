//! Step definitions for rollback orchestration scenarios.

pub mod world;

mod given;
mod then;
mod when;
