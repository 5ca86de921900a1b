//! Test helper utilities
//!
//! Shared utilities for dictionary-etl integration tests

pub mod db_utils;
pub mod extract;

pub use db_utils::{concept_meta_value, concept_paths, create_test_store};
pub use extract::{categorical_line, continuous_line, write_extract};
