//! Unit tests for the catalog module.

mod service_tests;
