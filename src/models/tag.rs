use serde::{Deserialize, Serialize};

/// A named label with a display color and an optional parent, forming a forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub parent_id: Option<i64>,
}
