//! Unit tests for unitflow-cli, organized by module.
//!
//! Each submodule documents the behaviour under test with Scenario/Given/When/Then
//! comments.
