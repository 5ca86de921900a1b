//! Flattening engine
//!
//! Reduces a [`ConceptGroup`] to one [`CanonicalConceptDescription`].
//!
//! # Rules
//! - One row: passed through unchanged
//! - Any continuous row: the group is continuous, folded to `[min, max]`
//! - Otherwise: categorical, values are the sorted, deduplicated union
//!
//! A categorical row inside a continuous group must hold exactly one numeric
//! value. Anything else makes the group ambiguous and fails it as a whole.

use crate::error::{IngestError, IngestResult};
use crate::models::{CanonicalConceptDescription, ConceptGroup, ConceptValues, RawColumnRow};
use std::collections::BTreeSet;

/// Flatten a concept group
pub fn flatten(group: &ConceptGroup) -> IngestResult<CanonicalConceptDescription> {
    match group.rows() {
        [] => Err(IngestError::flatten(group.path(), "group has no rows")),
        [row] => Ok(CanonicalConceptDescription::from_row(row)),
        rows if rows.iter().any(|row| !row.categorical) => flatten_continuous(group.path(), rows),
        rows => Ok(flatten_categorical(group.path(), rows)),
    }
}

fn flatten_categorical(path: &str, rows: &[RawColumnRow]) -> CanonicalConceptDescription {
    let values: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.values.iter().map(String::as_str))
        .collect();

    CanonicalConceptDescription {
        path: path.to_string(),
        values: ConceptValues::Categories(values.into_iter().map(str::to_string).collect()),
    }
}

fn flatten_continuous(path: &str, rows: &[RawColumnRow]) -> IngestResult<CanonicalConceptDescription> {
    let mut contributions = rows.iter().map(|row| numeric_contribution(path, row));

    // Seed from the first row, then widen with every other row
    let (mut min, mut max) = match contributions.next() {
        Some(first) => first?,
        None => return Err(IngestError::flatten(path, "group has no rows")),
    };
    for contribution in contributions {
        let (row_min, row_max) = contribution?;
        min = min.min(row_min);
        max = max.max(row_max);
    }

    Ok(CanonicalConceptDescription {
        path: path.to_string(),
        values: ConceptValues::Range { min, max },
    })
}

/// The `(min, max)` a row adds to a continuous group
fn numeric_contribution(path: &str, row: &RawColumnRow) -> IngestResult<(f64, f64)> {
    if !row.categorical {
        return Ok((row.min, row.max));
    }

    match row.values.as_slice() {
        [value] => value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| (n, n))
            .ok_or_else(|| {
                IngestError::flatten(path, format!("categorical value {:?} is not numeric", value))
            }),
        values => Err(IngestError::flatten(
            path,
            format!(
                "categorical row with {} values in a continuous group",
                values.len()
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Passthrough;

    fn categorical(path: &str, values: &[&str]) -> RawColumnRow {
        RawColumnRow {
            path: path.to_string(),
            width: 4,
            offset: 0,
            categorical: true,
            values: values.iter().map(|v| v.to_string()).collect(),
            min: 0.0,
            max: 0.0,
            passthrough: Passthrough::default(),
        }
    }

    fn continuous(path: &str, min: f64, max: f64) -> RawColumnRow {
        RawColumnRow {
            path: path.to_string(),
            width: 8,
            offset: 0,
            categorical: false,
            values: Vec::new(),
            min,
            max,
            passthrough: Passthrough::default(),
        }
    }

    fn group(rows: Vec<RawColumnRow>) -> ConceptGroup {
        ConceptGroup::new(rows[0].path.clone(), rows)
    }

    fn categories(d: &CanonicalConceptDescription) -> Vec<String> {
        match &d.values {
            ConceptValues::Categories(values) => values.clone(),
            other => panic!("expected categories, got {:?}", other),
        }
    }

    #[test]
    fn test_single_categorical_row_passes_through() {
        let d = flatten(&group(vec![categorical(r"\a\", &["Yes", "No"])])).unwrap();
        // Order of the single row is kept as-is
        assert_eq!(categories(&d), vec!["Yes", "No"]);
    }

    #[test]
    fn test_single_continuous_row_passes_through() {
        let d = flatten(&group(vec![continuous(r"\a\", 32.0, 170.7)])).unwrap();
        assert_eq!(d.values, ConceptValues::Range { min: 32.0, max: 170.7 });
    }

    #[test]
    fn test_categorical_union_is_deduplicated() {
        let d = flatten(&group(vec![
            categorical(r"\a\", &["1_10"]),
            categorical(r"\a\", &["1_11", "1_10"]),
            categorical(r"\a\", &["1_12"]),
        ]))
        .unwrap();

        assert!(d.is_categorical());
        assert_eq!(categories(&d), vec!["1_10", "1_11", "1_12"]);
    }

    #[test]
    fn test_categorical_union_is_order_independent() {
        let rows = vec![
            categorical(r"\a\", &["b"]),
            categorical(r"\a\", &["a", "c"]),
            categorical(r"\a\", &["c"]),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        assert_eq!(flatten(&group(rows)).unwrap(), flatten(&group(reversed)).unwrap());
    }

    #[test]
    fn test_continuous_range_covers_all_rows() {
        let rows = vec![
            continuous(r"\a\", 5.0, 10.0),
            continuous(r"\a\", -2.5, 4.0),
            categorical(r"\a\", &["42"]),
            continuous(r"\a\", 0.0, 12.0),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let d = flatten(&group(rows)).unwrap();
        assert_eq!(d.values, ConceptValues::Range { min: -2.5, max: 42.0 });
        assert_eq!(flatten(&group(reversed)).unwrap(), d);
    }

    #[test]
    fn test_multi_value_categorical_fails_continuous_group() {
        let result = flatten(&group(vec![
            continuous(r"\a\", 1.0, 2.0),
            categorical(r"\a\", &["x", "y"]),
        ]));
        assert!(matches!(result, Err(IngestError::Flatten { .. })));
    }

    #[test]
    fn test_non_numeric_single_value_fails_continuous_group() {
        let result = flatten(&group(vec![
            categorical(r"\a\", &["unknown"]),
            continuous(r"\a\", 1.0, 2.0),
        ]));
        assert!(matches!(result, Err(IngestError::Flatten { .. })));
    }

    #[test]
    fn test_empty_group_fails() {
        let result = flatten(&ConceptGroup::new(r"\a\".to_string(), Vec::new()));
        assert!(result.is_err());
    }
}
