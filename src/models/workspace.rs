use serde::{Deserialize, Serialize};

/// A rooted absolute directory the engine has been asked to index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: i64,
    pub path: String,
    pub name: String,
    pub created_at: String,
}
