//! Unit tests for store initialization

use dictionary_common::db::init::{init_database, init_schema};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("dictionary.db");

    let result = init_database(&db_path, 4).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("dictionary.db");

    let pool1 = init_database(&db_path, 2).await;
    assert!(pool1.is_ok());

    // Second open re-runs CREATE IF NOT EXISTS without error
    let pool2 = init_database(&db_path, 2).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_schema_creates_dictionary_tables() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("dictionary.db"), 2)
        .await
        .unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(tables, vec!["concept_node", "concept_node_meta", "dataset"]);
}

#[tokio::test]
async fn test_init_schema_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("dictionary.db"), 2)
        .await
        .unwrap();

    init_schema(&pool).await.expect("second schema init failed");
    init_schema(&pool).await.expect("third schema init failed");
}

#[tokio::test]
async fn test_concept_path_is_unique() {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("dictionary.db"), 2)
        .await
        .unwrap();

    sqlx::query("INSERT INTO dataset (ref, full_name) VALUES ('demo', 'demo')")
        .execute(&pool)
        .await
        .unwrap();

    let insert = "INSERT INTO concept_node (dataset_id, name, display, concept_type, concept_path) \
                  VALUES (1, 'demo', 'demo', 'categorical', '\\demo\\')";
    sqlx::query(insert).execute(&pool).await.unwrap();
    let duplicate = sqlx::query(insert).execute(&pool).await;

    assert!(duplicate.is_err(), "duplicate concept path was accepted");
}
