//! dictionary-etl library interface
//!
//! Concept-metadata ingestion: decodes a column-metadata extract, groups rows
//! by concept path, flattens each group and materializes it as a concept tree
//! in the dictionary store.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod utils;
pub mod workflow;

pub use crate::config::IngestConfig;
pub use crate::error::{IngestError, IngestResult};
pub use crate::models::{IngestStatus, IngestSummary};
pub use crate::workflow::{IngestPipeline, IngestRequest};
