//! Database models

use serde::{Deserialize, Serialize};

/// Value metadata key carried by leaf concepts
pub const VALUES_META_KEY: &str = "values";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Dataset {
    pub dataset_id: i64,
    #[sqlx(rename = "ref")]
    #[serde(rename = "ref")]
    pub dataset_ref: String,
    pub full_name: String,
    pub abbreviation: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConceptNode {
    pub concept_node_id: i64,
    pub dataset_id: i64,
    pub name: String,
    pub display: String,
    pub concept_type: String,
    pub concept_path: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConceptNodeMeta {
    pub concept_node_meta_id: i64,
    pub concept_node_id: i64,
    pub key: String,
    pub value: String,
}
