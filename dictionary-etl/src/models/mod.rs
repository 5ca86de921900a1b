//! Data models for dictionary-etl
//!
//! - Column rows and concept groups flowing through the pipeline
//! - Run summary returned to the caller

pub mod column_row;
pub mod ingest_result;

pub use column_row::{
    CanonicalConceptDescription, ConceptGroup, ConceptValues, Passthrough, RawColumnRow,
    CATEGORY_DELIMITER, PATH_SEPARATOR,
};
pub use ingest_result::{IngestStatus, IngestSummary};
