//! Unit tests for the rollback module.
