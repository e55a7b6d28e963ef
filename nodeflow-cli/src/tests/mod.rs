//! Unit tests for nodeflow-cli, organized by module.
//!
//! Each submodule documents the behaviour under test.
