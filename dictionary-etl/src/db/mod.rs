//! Database access for dictionary-etl

pub mod concept_meta;
pub mod concepts;
pub mod datasets;

use dictionary_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize the store pool sized to the ingest connection ceiling
pub async fn init_database_pool(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    tracing::debug!(path = %db_path.display(), max_connections, "Connecting to dictionary store");
    dictionary_common::db::init_database(db_path, max_connections).await
}
