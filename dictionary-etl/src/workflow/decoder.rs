//! Row decoder
//!
//! Decodes column-metadata extract records (11 positional CSV fields) into
//! [`RawColumnRow`]s with canonical `\seg\...\` paths. Malformed records are
//! logged and dropped; they never abort the run. A failure to read the extract
//! itself ends the stream and is kept for the caller.

use super::hierarchy::{canonical_path, join_segments, path_segments};
use crate::error::IngestResult;
use crate::models::{Passthrough, RawColumnRow, CATEGORY_DELIMITER};
use csv::{ErrorKind, ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{error, warn};

/// Positional fields per extract record
pub const FIELD_COUNT: usize = 11;

const NULL_SENTINEL: &str = "null";

/// Why a record was dropped
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("expected 11 fields, found {0}")]
    FieldCount(usize),

    #[error("field `{field}` is not an integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("categorical flag is not a boolean: {0:?}")]
    InvalidFlag(String),

    #[error("field `{field}` is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("concept path is empty")]
    EmptyPath,
}

/// Decode one parsed CSV record
pub fn decode_record(record: &StringRecord) -> Result<RawColumnRow, DecodeError> {
    if record.len() != FIELD_COUNT {
        return Err(DecodeError::FieldCount(record.len()));
    }
    let field = |i: usize| record.get(i).unwrap_or_default();

    let raw_path = field(0);
    if path_segments(raw_path).next().is_none() {
        return Err(DecodeError::EmptyPath);
    }

    let width = parse_integer("width", field(1))?;
    let offset = parse_integer("offset", field(2))?;
    let categorical = parse_flag(field(3))?;

    let values: Vec<String> = if categorical {
        field(4)
            .split(CATEGORY_DELIMITER)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    let min = parse_bound("min", field(5), categorical)?;
    let max = parse_bound("max", field(6), categorical)?;

    let path = if categorical {
        collapse_value_leaf(raw_path, &values)
    } else {
        canonical_path(raw_path)
    };

    Ok(RawColumnRow {
        path,
        width,
        offset,
        categorical,
        values,
        min,
        max,
        passthrough: Passthrough {
            observations_offset: field(7).to_string(),
            observations_length: field(8).to_string(),
            observation_count: field(9).to_string(),
            patient_count: field(10).to_string(),
        },
    })
}

/// Fold a single category value that repeats the trailing path segment into the path
///
/// `\demographics\area\1_10\` with the sole value `1_10` becomes
/// `\demographics\area\`. At least one segment is always kept. The result is
/// canonical either way.
pub fn collapse_value_leaf(path: &str, values: &[String]) -> String {
    let segments: Vec<&str> = path_segments(path).collect();
    match (values, segments.split_last()) {
        ([value], Some((last, parents))) if !parents.is_empty() && last.trim() == value.trim() => {
            join_segments(parents.iter().copied())
        }
        _ => join_segments(segments),
    }
}

fn parse_integer(field: &'static str, value: &str) -> Result<i64, DecodeError> {
    value.trim().parse().map_err(|_| DecodeError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

fn parse_flag(value: &str) -> Result<bool, DecodeError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DecodeError::InvalidFlag(value.to_string())),
    }
}

/// Categorical rows map the `null`/empty sentinel to 0; continuous rows need a number
fn parse_bound(field: &'static str, value: &str, categorical: bool) -> Result<f64, DecodeError> {
    let trimmed = value.trim();
    if categorical && (trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NULL_SENTINEL)) {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(DecodeError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

fn csv_reader<R: Read>(source: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source)
}

/// Streaming decoder over an extract
///
/// Yields decoded rows in stream order and counts what it dropped. An I/O
/// error ends the stream; check [`ColumnMetaReader::take_error`] afterwards.
pub struct ColumnMetaReader<R: Read> {
    records: StringRecordsIntoIter<R>,
    records_read: usize,
    records_dropped: usize,
    read_error: Option<csv::Error>,
}

impl ColumnMetaReader<File> {
    /// Open an extract file; failure to open is fatal for the run
    pub fn open(path: &Path) -> IngestResult<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> ColumnMetaReader<R> {
    pub fn from_reader(source: R) -> Self {
        Self {
            records: csv_reader(source).into_records(),
            records_read: 0,
            records_dropped: 0,
            read_error: None,
        }
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    pub fn records_dropped(&self) -> usize {
        self.records_dropped
    }

    /// The I/O error that ended the stream, if any
    pub fn take_error(&mut self) -> Option<csv::Error> {
        self.read_error.take()
    }
}

impl<R: Read> Iterator for ColumnMetaReader<R> {
    type Item = RawColumnRow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.read_error.is_some() {
            return None;
        }

        for result in self.records.by_ref() {
            match result {
                Ok(record) => {
                    self.records_read += 1;
                    match decode_record(&record) {
                        Ok(row) => return Some(row),
                        Err(e) => {
                            self.records_dropped += 1;
                            warn!(
                                line = record.position().map(|p| p.line()),
                                error = %e,
                                "Dropping malformed extract record"
                            );
                        }
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::Io(_)) => {
                    error!(error = %e, "Extract read failed");
                    self.read_error = Some(e);
                    return None;
                }
                Err(e) => {
                    self.records_read += 1;
                    self.records_dropped += 1;
                    warn!(error = %e, "Dropping unreadable extract record");
                }
            }
        }
        None
    }
}
