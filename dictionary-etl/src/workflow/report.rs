//! Error report export
//!
//! Writes a header row, then every row of every quarantined group as one CSV
//! line: the row's path, width, offset, flag and category values followed by
//! its four passthrough fields. The numeric bounds are not included.

use super::quarantine::QuarantinedGroup;
use crate::error::IngestResult;
use csv::Writer;
use std::fs;
use std::path::Path;
use tracing::info;

const REPORT_HEADER: [&str; 9] = [
    "path",
    "width",
    "offset",
    "categorical",
    "category_values",
    "observations_offset",
    "observations_length",
    "observation_count",
    "patient_count",
];

/// Write the error report, returning the number of rows written
///
/// Entries are expected in path order, as returned by
/// [`ErrorQuarantine::drain`](super::quarantine::ErrorQuarantine::drain).
pub fn write_error_report(path: &Path, entries: &[QuarantinedGroup]) -> IngestResult<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(path)?;
    writer.write_record(REPORT_HEADER)?;

    let mut rows_written = 0;
    for entry in entries {
        for row in entry.group.rows() {
            writer.write_record([
                row.path.clone(),
                row.width.to_string(),
                row.offset.to_string(),
                row.categorical.to_string(),
                row.joined_values(),
                row.passthrough.observations_offset.clone(),
                row.passthrough.observations_length.clone(),
                row.passthrough.observation_count.clone(),
                row.passthrough.patient_count.clone(),
            ])?;
            rows_written += 1;
        }
    }
    writer.flush()?;

    info!(
        report = %path.display(),
        groups = entries.len(),
        rows = rows_written,
        "Error report written"
    );
    Ok(rows_written)
}
