use serde::{Deserialize, Serialize};

/// Parameters for `search_files_by_tags`: files must carry every tag id
/// listed (set intersection), optionally restricted to a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilesByTagsParams {
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub folder_relpath: String,
    #[serde(default)]
    pub include_subfolders: bool,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
