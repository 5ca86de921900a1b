//! Column-metadata rows and their reductions

use serde::{Deserialize, Serialize};

/// Separator between concept path segments
pub const PATH_SEPARATOR: char = '\\';

/// Private delimiter joining category values inside one field
pub const CATEGORY_DELIMITER: char = 'µ';

/// Opaque observation fields carried only for error reporting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Passthrough {
    pub observations_offset: String,
    pub observations_length: String,
    pub observation_count: String,
    pub patient_count: String,
}

/// One decoded extract record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawColumnRow {
    /// Concept path, after value-as-leaf collapsing
    pub path: String,
    /// Width in bytes of the column
    pub width: i64,
    /// Byte offset of the column
    pub offset: i64,
    pub categorical: bool,
    /// Category values; empty for continuous rows
    pub values: Vec<String>,
    pub min: f64,
    pub max: f64,
    pub passthrough: Passthrough,
}

impl RawColumnRow {
    /// Category values rejoined with the private delimiter
    pub fn joined_values(&self) -> String {
        self.values.join(&CATEGORY_DELIMITER.to_string())
    }
}

/// Contiguous rows sharing one concept path
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptGroup {
    path: String,
    rows: Vec<RawColumnRow>,
}

impl ConceptGroup {
    pub fn new(path: String, rows: Vec<RawColumnRow>) -> Self {
        Self { path, rows }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn rows(&self) -> &[RawColumnRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Merged values of a flattened concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConceptValues {
    Categories(Vec<String>),
    Range { min: f64, max: f64 },
}

/// Flattened, canonical description of one concept path
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalConceptDescription {
    pub path: String,
    pub values: ConceptValues,
}

impl CanonicalConceptDescription {
    /// Describe a single row as-is
    pub fn from_row(row: &RawColumnRow) -> Self {
        let values = if row.categorical {
            ConceptValues::Categories(row.values.clone())
        } else {
            ConceptValues::Range {
                min: row.min,
                max: row.max,
            }
        };
        Self {
            path: row.path.clone(),
            values,
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.values, ConceptValues::Categories(_))
    }

    /// Concept type tag stored on created concepts
    pub fn concept_type(&self) -> &'static str {
        if self.is_categorical() {
            "categorical"
        } else {
            "continuous"
        }
    }

    /// JSON value stored under the leaf's `values` key
    pub fn metadata_json(&self) -> serde_json::Result<String> {
        match &self.values {
            ConceptValues::Categories(values) => serde_json::to_string(values),
            ConceptValues::Range { min, max } => serde_json::to_string(&[*min, *max]),
        }
    }
}
