//! Concept node database operations

use dictionary_common::db::ConceptNode;
use dictionary_common::Result;
use sqlx::SqlitePool;

/// Concept to resolve-or-create
#[derive(Debug, Clone)]
pub struct NewConcept<'a> {
    pub dataset_id: i64,
    pub name: &'a str,
    pub display: &'a str,
    pub concept_type: &'a str,
    pub concept_path: &'a str,
    pub parent_id: Option<i64>,
}

/// Resolve a concept by path, creating it when absent
///
/// An existing record is returned untouched. Returns the concept id and
/// whether this call inserted it.
pub async fn upsert_concept(pool: &SqlitePool, concept: &NewConcept<'_>) -> Result<(i64, bool)> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO concept_node (dataset_id, name, display, concept_type, concept_path, parent_id)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(concept_path) DO NOTHING
        "#,
    )
    .bind(concept.dataset_id)
    .bind(concept.name)
    .bind(concept.display)
    .bind(concept.concept_type)
    .bind(concept.concept_path)
    .bind(concept.parent_id)
    .execute(pool)
    .await?
    .rows_affected()
        == 1;

    let concept_id: i64 =
        sqlx::query_scalar("SELECT concept_node_id FROM concept_node WHERE concept_path = ?")
            .bind(concept.concept_path)
            .fetch_one(pool)
            .await?;

    Ok((concept_id, inserted))
}

/// Load concept by full path
pub async fn load_concept_by_path(pool: &SqlitePool, concept_path: &str) -> Result<Option<ConceptNode>> {
    let concept = sqlx::query_as::<_, ConceptNode>(
        r#"
        SELECT concept_node_id, dataset_id, name, display, concept_type, concept_path, parent_id
        FROM concept_node
        WHERE concept_path = ?
        "#,
    )
    .bind(concept_path)
    .fetch_optional(pool)
    .await?;

    Ok(concept)
}

/// Load direct children of a concept, ordered by path
pub async fn load_children(pool: &SqlitePool, parent_id: i64) -> Result<Vec<ConceptNode>> {
    let children = sqlx::query_as::<_, ConceptNode>(
        r#"
        SELECT concept_node_id, dataset_id, name, display, concept_type, concept_path, parent_id
        FROM concept_node
        WHERE parent_id = ?
        ORDER BY concept_path
        "#,
    )
    .bind(parent_id)
    .fetch_all(pool)
    .await?;

    Ok(children)
}

/// Count all concepts
pub async fn count_concepts(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM concept_node")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upsert_concept_links_parent() {
        let temp_dir = TempDir::new().unwrap();
        let pool = crate::db::init_database_pool(&temp_dir.path().join("t.db"), 2)
            .await
            .expect("Failed to create database");
        let (dataset_id, _) = crate::db::datasets::upsert_dataset(&pool, "demo").await.unwrap();

        let (root_id, created) = upsert_concept(
            &pool,
            &NewConcept {
                dataset_id,
                name: "demo",
                display: "demo",
                concept_type: "categorical",
                concept_path: "\\demo\\",
                parent_id: None,
            },
        )
        .await
        .unwrap();
        assert!(created);

        let (child_id, _) = upsert_concept(
            &pool,
            &NewConcept {
                dataset_id,
                name: "age",
                display: "age",
                concept_type: "continuous",
                concept_path: "\\demo\\age\\",
                parent_id: Some(root_id),
            },
        )
        .await
        .unwrap();

        let children = load_children(&pool, root_id).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].concept_node_id, child_id);
        assert_eq!(children[0].concept_type, "continuous");
    }

    #[tokio::test]
    async fn test_upsert_concept_reuses_existing_path() {
        let temp_dir = TempDir::new().unwrap();
        let pool = crate::db::init_database_pool(&temp_dir.path().join("t.db"), 2)
            .await
            .expect("Failed to create database");
        let (dataset_id, _) = crate::db::datasets::upsert_dataset(&pool, "demo").await.unwrap();

        let concept = NewConcept {
            dataset_id,
            name: "demo",
            display: "demo",
            concept_type: "categorical",
            concept_path: "\\demo\\",
            parent_id: None,
        };
        let (first, _) = upsert_concept(&pool, &concept).await.unwrap();
        let (second, created) = upsert_concept(
            &pool,
            &NewConcept {
                concept_type: "continuous",
                ..concept.clone()
            },
        )
        .await
        .unwrap();

        assert_eq!(first, second);
        assert!(!created);
        assert_eq!(count_concepts(&pool).await.unwrap(), 1);

        // The first writer's type tag is kept
        let loaded = load_concept_by_path(&pool, "\\demo\\").await.unwrap().unwrap();
        assert_eq!(loaded.concept_type, "categorical");
    }
}
