//! Error quarantine
//!
//! Collects groups that failed to flatten or materialize, keyed by concept
//! path. The first failure recorded for a path wins.

use crate::models::ConceptGroup;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// A failed group and the reason it failed
#[derive(Debug, Clone)]
pub struct QuarantinedGroup {
    pub group: ConceptGroup,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ErrorQuarantine {
    entries: Mutex<BTreeMap<String, QuarantinedGroup>>,
}

impl ErrorQuarantine {
    /// Record a failed group; returns false if its path was already quarantined
    pub async fn insert(&self, group: ConceptGroup, reason: impl Into<String>) -> bool {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(group.path()) {
            return false;
        }
        entries.insert(
            group.path().to_string(),
            QuarantinedGroup {
                group,
                reason: reason.into(),
            },
        );
        true
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Remove and return every entry, ordered by path
    pub async fn drain(&self) -> Vec<QuarantinedGroup> {
        let mut entries = self.entries.lock().await;
        std::mem::take(&mut *entries).into_values().collect()
    }
}
