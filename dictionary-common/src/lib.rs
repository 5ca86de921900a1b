//! # Dictionary Common Library
//!
//! Shared code for the data-dictionary workspace:
//! - Error and result types
//! - Root folder resolution and TOML configuration
//! - SQLite store initialization and row models

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
