//! Ingest run results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Definitive outcome of one ingest run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestStatus {
    /// Every group materialized
    Success,
    /// Some groups were quarantined and written to the report
    CompletedWithErrors { report_path: PathBuf },
}

impl IngestStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, IngestStatus::Success)
    }
}

impl fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestStatus::Success => write!(f, "success"),
            IngestStatus::CompletedWithErrors { report_path } => {
                write!(f, "completed with errors, see `{}`", report_path.display())
            }
        }
    }
}

/// Counters and status for one ingest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Extract records read (decoded or not)
    pub records_read: usize,
    /// Records dropped by the decoder
    pub records_dropped: usize,
    pub groups_enqueued: usize,
    pub groups_materialized: usize,
    pub groups_quarantined: usize,
    pub concepts_created: usize,
    pub datasets_created: usize,
    pub status: IngestStatus,
}

impl IngestSummary {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(IngestStatus::Success.to_string(), "success");

        let partial = IngestStatus::CompletedWithErrors {
            report_path: PathBuf::from("/tmp/errors.csv"),
        };
        assert_eq!(partial.to_string(), "completed with errors, see `/tmp/errors.csv`");
        assert!(!partial.is_success());
    }
}
