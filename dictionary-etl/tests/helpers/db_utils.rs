//! Store test utilities

#![allow(dead_code)]

use anyhow::Result;
use dictionary_common::db::VALUES_META_KEY;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create a temporary dictionary store with the schema applied
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_store(max_connections: u32) -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("dictionary.db");
    let pool = dictionary_etl::db::init_database_pool(&db_path, max_connections).await?;
    Ok((temp_dir, pool))
}

/// All persisted concept paths, sorted
pub async fn concept_paths(pool: &SqlitePool) -> Result<Vec<String>> {
    let paths = sqlx::query_scalar::<_, String>(
        "SELECT concept_path FROM concept_node ORDER BY concept_path",
    )
    .fetch_all(pool)
    .await?;
    Ok(paths)
}

/// The `values` metadata of the concept at `concept_path`
pub async fn concept_meta_value(pool: &SqlitePool, concept_path: &str) -> Result<Option<String>> {
    let value = sqlx::query_scalar::<_, String>(
        r#"
        SELECT m.value
        FROM concept_node_meta m
        JOIN concept_node c ON c.concept_node_id = m.concept_node_id
        WHERE c.concept_path = ? AND m.key = ?
        "#,
    )
    .bind(concept_path)
    .bind(VALUES_META_KEY)
    .fetch_optional(pool)
    .await?;
    Ok(value)
}
