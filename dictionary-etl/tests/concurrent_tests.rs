//! Integration tests for concurrent materialization
//!
//! Many groups sharing ancestors are materialized at once; every path and
//! every dataset must end up stored exactly once.

mod helpers;

use dictionary_etl::db::concepts::{count_concepts, load_children, load_concept_by_path};
use dictionary_etl::db::datasets::load_all_datasets;
use dictionary_etl::models::{CanonicalConceptDescription, ConceptValues};
use dictionary_etl::workflow::hierarchy::build_hierarchy;
use dictionary_etl::workflow::materializer::Materializer;
use dictionary_etl::{IngestConfig, IngestPipeline, IngestRequest};
use helpers::{categorical_line, concept_paths, continuous_line, create_test_store, write_extract};
use std::sync::Arc;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_ancestor_created_once() {
    let (_temp_dir, pool) = create_test_store(8).await.unwrap();
    let materializer = Arc::new(Materializer::new(pool.clone(), None, 10_000));

    let mut join_set = JoinSet::new();
    for i in 0..32 {
        let materializer = Arc::clone(&materializer);
        join_set.spawn(async move {
            let description = CanonicalConceptDescription {
                path: format!(r"\study\visit\var{}\", i),
                values: ConceptValues::Range {
                    min: 0.0,
                    max: i as f64,
                },
            };
            let chain = build_hierarchy(&description.path);
            materializer
                .materialize(&description, &chain)
                .await
                .unwrap_or_else(|e| panic!("Task {} failed: {}", i, e))
        });
    }

    let mut leaf_ids = Vec::new();
    while let Some(result) = join_set.join_next().await {
        leaf_ids.push(result.expect("Task panicked").leaf_id);
    }
    leaf_ids.sort_unstable();
    leaf_ids.dedup();
    assert_eq!(leaf_ids.len(), 32);

    // study + visit + 32 leaves
    assert_eq!(count_concepts(&pool).await.unwrap(), 34);
    assert_eq!(load_all_datasets(&pool).await.unwrap().len(), 1);
    assert_eq!(materializer.concepts_created(), 34);

    let visit = load_concept_by_path(&pool, r"\study\visit\")
        .await
        .unwrap()
        .unwrap();
    let children = load_children(&pool, visit.concept_node_id).await.unwrap();
    assert_eq!(children.len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_ingest_of_wide_extract() {
    let (temp_dir, pool) = create_test_store(10).await.unwrap();

    let mut lines = Vec::new();
    for dataset in 0..3 {
        for var in 0..40 {
            let path = format!(r"\ds{}\section{}\var{}\", dataset, var % 4, var);
            if var % 2 == 0 {
                lines.push(continuous_line(&path, 1.0, 2.0));
                lines.push(continuous_line(&path, -1.0, 5.0));
            } else {
                lines.push(categorical_line(&path, &["a", "b"]));
                lines.push(categorical_line(&path, &["c"]));
            }
        }
    }
    let input = write_extract(temp_dir.path(), "columnMeta.csv", &lines);

    let config = IngestConfig {
        max_connections: 10,
        connection_margin: 2,
        queue_capacity: 8,
        max_lock_wait_ms: 10_000,
    };
    let summary = IngestPipeline::new(pool.clone(), config)
        .run(IngestRequest {
            input_path: input,
            report_path: temp_dir.path().join("errors.csv"),
            dataset_override: None,
        })
        .await
        .unwrap();

    assert!(summary.status.is_success(), "status: {}", summary.status);
    assert_eq!(summary.records_read, 240);
    assert_eq!(summary.groups_enqueued, 120);
    assert_eq!(summary.groups_materialized, 120);
    assert_eq!(summary.datasets_created, 3);

    // 3 roots + 12 sections + 120 variables
    let paths = concept_paths(&pool).await.unwrap();
    assert_eq!(paths.len(), 135);
    assert_eq!(summary.concepts_created, 135);
}
