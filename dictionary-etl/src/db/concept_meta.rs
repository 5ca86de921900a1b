//! Concept value-metadata database operations

use dictionary_common::db::ConceptNodeMeta;
use dictionary_common::Result;
use sqlx::SqlitePool;

/// Attach a key/value record to a concept once
///
/// Returns false when the concept already carries the key.
pub async fn insert_concept_meta(
    pool: &SqlitePool,
    concept_node_id: i64,
    key: &str,
    value: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO concept_node_meta (concept_node_id, key, value)
        VALUES (?, ?, ?)
        ON CONFLICT(concept_node_id, key) DO NOTHING
        "#,
    )
    .bind(concept_node_id)
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Load one metadata value
pub async fn load_concept_meta(
    pool: &SqlitePool,
    concept_node_id: i64,
    key: &str,
) -> Result<Option<String>> {
    let value = sqlx::query_scalar(
        "SELECT value FROM concept_node_meta WHERE concept_node_id = ? AND key = ?",
    )
    .bind(concept_node_id)
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(value)
}

/// Load every metadata record attached to a concept, ordered by key
pub async fn load_all_concept_meta(
    pool: &SqlitePool,
    concept_node_id: i64,
) -> Result<Vec<ConceptNodeMeta>> {
    let entries = sqlx::query_as::<_, ConceptNodeMeta>(
        r#"
        SELECT concept_node_meta_id, concept_node_id, key, value
        FROM concept_node_meta
        WHERE concept_node_id = ?
        ORDER BY key
        "#,
    )
    .bind(concept_node_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}
