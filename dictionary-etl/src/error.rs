//! Error types for dictionary-etl
//!
//! Run-level variants abort the ingest; group-level variants are caught by the
//! worker and turned into quarantine entries.

use thiserror::Error;

/// Ingest pipeline error type
#[derive(Debug, Error)]
pub enum IngestError {
    /// Store, IO or configuration failure from the shared crate
    #[error(transparent)]
    Common(#[from] dictionary_common::Error),

    /// Extract could not be read as CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Value metadata could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Group rows cannot be reduced to one description
    #[error("Cannot flatten {path}: {reason}")]
    Flatten { path: String, reason: String },

    /// Concept path has no segments
    #[error("Concept path has no segments: {0:?}")]
    EmptyPath(String),

    /// Worker pool cannot be sized from the store connection ceiling
    #[error("No store connections left for workers (max {max_connections}, margin {margin})")]
    ResourceExhausted { max_connections: u32, margin: u32 },

    /// Error report path rejected before any work begins
    #[error("Error report must be a .csv file: {0}")]
    InvalidReportPath(String),
}

impl IngestError {
    pub(crate) fn flatten(path: &str, reason: impl Into<String>) -> Self {
        IngestError::Flatten {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for IngestError {
    fn from(err: sqlx::Error) -> Self {
        IngestError::Common(dictionary_common::Error::Database(err))
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Common(dictionary_common::Error::Io(err))
    }
}

/// Result type for the ingest pipeline
pub type IngestResult<T> = Result<T, IngestError>;
