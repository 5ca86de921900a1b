//! Group processing
//!
//! The unit of work run on the worker pool: flatten, build the hierarchy,
//! materialize. Any failure quarantines the group and never reaches its
//! siblings.

use super::accumulator::QueuedGroup;
use super::flattener::flatten;
use super::hierarchy::build_hierarchy;
use super::materializer::{MaterializedConcept, Materializer};
use super::quarantine::ErrorQuarantine;
use crate::error::{IngestError, IngestResult};
use crate::models::ConceptGroup;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct GroupProcessor {
    materializer: Arc<Materializer>,
    quarantine: Arc<ErrorQuarantine>,
    materialized: AtomicUsize,
    failed: AtomicUsize,
}

impl GroupProcessor {
    pub fn new(materializer: Arc<Materializer>, quarantine: Arc<ErrorQuarantine>) -> Self {
        Self {
            materializer,
            quarantine,
            materialized: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Process one queued group; the group's guard is released on return
    pub async fn process(&self, queued: QueuedGroup) {
        let (group, _guard) = queued.into_parts();

        match self.materialize_group(&group).await {
            Ok(concept) => {
                self.materialized.fetch_add(1, Ordering::Relaxed);
                if let Some(stored) = &concept.conflicting_metadata {
                    warn!(
                        path = %group.path(),
                        leaf_id = concept.leaf_id,
                        stored = %stored,
                        "Leaf already carries different values; keeping the stored ones"
                    );
                }
                debug!(
                    path = %group.path(),
                    rows = group.len(),
                    leaf_id = concept.leaf_id,
                    "Group materialized"
                );
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    path = %group.path(),
                    rows = group.len(),
                    error = %e,
                    "Group quarantined"
                );
                self.quarantine.insert(group, e.to_string()).await;
            }
        }
    }

    async fn materialize_group(&self, group: &ConceptGroup) -> IngestResult<MaterializedConcept> {
        let description = flatten(group)?;
        let chain = build_hierarchy(&description.path);
        if chain.is_empty() {
            return Err(IngestError::EmptyPath(description.path));
        }
        self.materializer.materialize(&description, &chain).await
    }

    pub fn materialized(&self) -> usize {
        self.materialized.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}
