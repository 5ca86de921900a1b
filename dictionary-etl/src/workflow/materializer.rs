//! Materializer
//!
//! Resolves-or-creates the dataset, every concept along a node chain and the
//! leaf's value metadata. Dataset and concept ids are memoized for the whole
//! run; the memo tables are the only state shared between workers.

use super::hierarchy::ConceptNode;
use crate::db::concept_meta::{insert_concept_meta, load_concept_meta};
use crate::db::concepts::{upsert_concept, NewConcept};
use crate::db::datasets::upsert_dataset;
use crate::error::{IngestError, IngestResult};
use crate::models::CanonicalConceptDescription;
use crate::utils::retry_on_lock;
use dictionary_common::db::VALUES_META_KEY;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

/// Keyed compute-if-absent table
///
/// Each key owns a `OnceCell`, so concurrent callers for one key run the
/// initializer once and all observe its id. A failed initializer leaves the
/// key empty for the next caller.
#[derive(Default)]
pub struct MemoTable {
    cells: Mutex<HashMap<String, Arc<OnceCell<i64>>>>,
}

impl MemoTable {
    pub async fn get_or_try_init<F, Fut>(&self, key: &str, init: F) -> IngestResult<i64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = IngestResult<i64>>,
    {
        let cell = {
            let mut cells = self.cells.lock().await;
            Arc::clone(cells.entry(key.to_string()).or_default())
        };
        cell.get_or_try_init(init).await.copied()
    }

    pub async fn get(&self, key: &str) -> Option<i64> {
        let cells = self.cells.lock().await;
        cells.get(key).and_then(|cell| cell.get().copied())
    }
}

/// Result of materializing one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedConcept {
    pub dataset_id: i64,
    pub leaf_id: i64,
    /// False when the leaf already carried value metadata
    pub metadata_attached: bool,
    /// Value metadata the leaf already carried, when it differs from this group's
    pub conflicting_metadata: Option<String>,
}

/// Writes node chains into the dictionary store
pub struct Materializer {
    db: SqlitePool,
    dataset_override: Option<String>,
    max_lock_wait_ms: u64,
    datasets: MemoTable,
    concepts: MemoTable,
    datasets_created: AtomicUsize,
    concepts_created: AtomicUsize,
}

impl Materializer {
    /// Create a materializer
    ///
    /// With `dataset_override` every concept attaches to that dataset instead
    /// of the dataset named by the path's first segment.
    pub fn new(db: SqlitePool, dataset_override: Option<String>, max_lock_wait_ms: u64) -> Self {
        Self {
            db,
            dataset_override: dataset_override.filter(|name| !name.trim().is_empty()),
            max_lock_wait_ms,
            datasets: MemoTable::default(),
            concepts: MemoTable::default(),
            datasets_created: AtomicUsize::new(0),
            concepts_created: AtomicUsize::new(0),
        }
    }

    /// Materialize one flattened concept along its node chain (root first)
    pub async fn materialize(
        &self,
        description: &CanonicalConceptDescription,
        chain: &[ConceptNode],
    ) -> IngestResult<MaterializedConcept> {
        let root = chain
            .first()
            .ok_or_else(|| IngestError::EmptyPath(description.path.clone()))?;
        let dataset_ref = self.dataset_override.as_deref().unwrap_or(&root.label);
        let dataset_id = self.resolve_dataset(dataset_ref).await?;

        let concept_type = description.concept_type();
        let mut parent_id = None;
        for node in chain {
            let concept_id = self
                .resolve_concept(dataset_id, node, parent_id, concept_type)
                .await?;
            parent_id = Some(concept_id);
        }
        let leaf_id = parent_id.ok_or_else(|| IngestError::EmptyPath(description.path.clone()))?;

        let value = description.metadata_json()?;
        let metadata_attached = retry_on_lock("concept metadata insert", self.max_lock_wait_ms, || {
            insert_concept_meta(&self.db, leaf_id, VALUES_META_KEY, &value)
        })
        .await?;

        let conflicting_metadata = if metadata_attached {
            None
        } else {
            retry_on_lock("concept metadata load", self.max_lock_wait_ms, || {
                load_concept_meta(&self.db, leaf_id, VALUES_META_KEY)
            })
            .await?
            .filter(|stored| *stored != value)
        };

        debug!(
            path = %description.path,
            leaf_id,
            metadata_attached,
            "Concept materialized"
        );

        Ok(MaterializedConcept {
            dataset_id,
            leaf_id,
            metadata_attached,
            conflicting_metadata,
        })
    }

    async fn resolve_dataset(&self, dataset_ref: &str) -> IngestResult<i64> {
        self.datasets
            .get_or_try_init(dataset_ref, || async {
                let (dataset_id, created) =
                    retry_on_lock("dataset upsert", self.max_lock_wait_ms, || {
                        upsert_dataset(&self.db, dataset_ref)
                    })
                    .await?;
                if created {
                    self.datasets_created.fetch_add(1, Ordering::Relaxed);
                    info!(dataset = dataset_ref, dataset_id, "Created dataset");
                }
                Ok::<_, IngestError>(dataset_id)
            })
            .await
    }

    async fn resolve_concept(
        &self,
        dataset_id: i64,
        node: &ConceptNode,
        parent_id: Option<i64>,
        concept_type: &str,
    ) -> IngestResult<i64> {
        self.concepts
            .get_or_try_init(&node.path, || async {
                let concept = NewConcept {
                    dataset_id,
                    name: &node.label,
                    display: &node.label,
                    concept_type,
                    concept_path: &node.path,
                    parent_id,
                };
                let (concept_id, created) =
                    retry_on_lock("concept upsert", self.max_lock_wait_ms, || {
                        upsert_concept(&self.db, &concept)
                    })
                    .await?;
                if created {
                    self.concepts_created.fetch_add(1, Ordering::Relaxed);
                }
                Ok::<_, IngestError>(concept_id)
            })
            .await
    }

    /// Memoized concept id for a path, if this run resolved it
    pub async fn concept_id(&self, concept_path: &str) -> Option<i64> {
        self.concepts.get(concept_path).await
    }

    /// Datasets inserted by this run
    pub fn datasets_created(&self) -> usize {
        self.datasets_created.load(Ordering::Relaxed)
    }

    /// Concepts inserted by this run
    pub fn concepts_created(&self) -> usize {
        self.concepts_created.load(Ordering::Relaxed)
    }
}
