//! Hierarchy builder
//!
//! Decomposes a concept path into its chain of ancestor nodes, root first.

use crate::models::PATH_SEPARATOR;

/// One level of a concept path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptNode {
    /// Accumulated path through this level, e.g. `\A\B\`
    pub path: String,
    /// Raw segment text, e.g. `B`
    pub label: String,
}

/// Non-empty segments of a path, in order
pub fn path_segments<'a>(concept_path: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    concept_path
        .split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
}

/// Rebuild a path from segments as `\seg\...\seg\`
///
/// Returns an empty string when there are no segments.
pub fn join_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut path = String::new();
    for segment in segments {
        if path.is_empty() {
            path.push(PATH_SEPARATOR);
        }
        path.push_str(segment);
        path.push(PATH_SEPARATOR);
    }
    path
}

/// Canonical spelling of a path, the same one [`build_hierarchy`] gives its leaf
///
/// `a\b`, `\a\b` and `\\a\\b\` all become `\a\b\`.
pub fn canonical_path(concept_path: &str) -> String {
    join_segments(path_segments(concept_path))
}

/// Build the ordered node chain for a path
///
/// `\A\B\C\` yields `\A\`, `\A\B\`, `\A\B\C\`. Empty segments are skipped.
pub fn build_hierarchy(concept_path: &str) -> Vec<ConceptNode> {
    let mut prefix = String::with_capacity(concept_path.len() + 2);
    prefix.push(PATH_SEPARATOR);

    path_segments(concept_path)
        .map(|segment| {
            prefix.push_str(segment);
            prefix.push(PATH_SEPARATOR);
            ConceptNode {
                path: prefix.clone(),
                label: segment.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_level_path() {
        let chain = build_hierarchy(r"\A\B\C\");
        let paths: Vec<&str> = chain.iter().map(|n| n.path.as_str()).collect();
        let labels: Vec<&str> = chain.iter().map(|n| n.label.as_str()).collect();

        assert_eq!(paths, vec![r"\A\", r"\A\B\", r"\A\B\C\"]);
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let chain = build_hierarchy(r"\\A\\B\");
        let paths: Vec<&str> = chain.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec![r"\A\", r"\A\B\"]);
    }

    #[test]
    fn test_missing_outer_separators() {
        let chain = build_hierarchy("A\\B");
        assert_eq!(chain.last().map(|n| n.path.as_str()), Some(r"\A\B\"));
    }

    #[test]
    fn test_segment_text_is_kept_verbatim() {
        let chain = build_hierarchy(r"\examination\body measures\Waist Circumference (cm)\");
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[2].label, "Waist Circumference (cm)");
    }

    #[test]
    fn test_canonical_path_matches_chain_leaf() {
        for raw in [r"\a\b", "a\\b", r"\\a\\b\", r"\a\b\"] {
            assert_eq!(canonical_path(raw), r"\a\b\");
            assert_eq!(
                build_hierarchy(raw).last().map(|n| n.path.clone()),
                Some(canonical_path(raw))
            );
        }
        assert_eq!(canonical_path(r"\\"), "");
    }

    #[test]
    fn test_no_segments() {
        assert!(build_hierarchy(r"\\").is_empty());
        assert!(build_hierarchy("").is_empty());
    }
}
