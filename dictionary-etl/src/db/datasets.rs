//! Dataset database operations

use dictionary_common::db::Dataset;
use dictionary_common::Result;
use sqlx::SqlitePool;

/// Resolve a dataset by reference, creating it when absent
///
/// Returns the dataset id and whether this call inserted it.
pub async fn upsert_dataset(pool: &SqlitePool, dataset_ref: &str) -> Result<(i64, bool)> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO dataset (ref, full_name, abbreviation, description)
        VALUES (?, ?, ?, '')
        ON CONFLICT(ref) DO NOTHING
        "#,
    )
    .bind(dataset_ref)
    .bind(dataset_ref)
    .bind(dataset_ref)
    .execute(pool)
    .await?
    .rows_affected()
        == 1;

    let dataset_id: i64 = sqlx::query_scalar("SELECT dataset_id FROM dataset WHERE ref = ?")
        .bind(dataset_ref)
        .fetch_one(pool)
        .await?;

    Ok((dataset_id, inserted))
}

/// Load dataset by reference
pub async fn load_dataset_by_ref(pool: &SqlitePool, dataset_ref: &str) -> Result<Option<Dataset>> {
    let dataset = sqlx::query_as::<_, Dataset>(
        r#"
        SELECT dataset_id, ref, full_name, abbreviation, description
        FROM dataset
        WHERE ref = ?
        "#,
    )
    .bind(dataset_ref)
    .fetch_optional(pool)
    .await?;

    Ok(dataset)
}

/// Load all datasets ordered by reference
pub async fn load_all_datasets(pool: &SqlitePool) -> Result<Vec<Dataset>> {
    let datasets = sqlx::query_as::<_, Dataset>(
        "SELECT dataset_id, ref, full_name, abbreviation, description FROM dataset ORDER BY ref",
    )
    .fetch_all(pool)
    .await?;

    Ok(datasets)
}
