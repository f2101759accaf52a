use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecentItemKind {
    Workspace,
    Folder,
}

impl RecentItemKind {
    pub fn as_db_str(self) -> &'static str {
        match self {
            RecentItemKind::Workspace => "workspace",
            RecentItemKind::Folder => "folder",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "workspace" => Some(RecentItemKind::Workspace),
            "folder" => Some(RecentItemKind::Folder),
            _ => None,
        }
    }
}

/// A recently opened workspace or folder, deduplicated by absolute path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentItem {
    pub id: i64,
    pub kind: RecentItemKind,
    pub path: String,
    pub name: String,
    pub opened_at: String,
}
