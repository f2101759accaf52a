use serde::{Deserialize, Serialize};

use crate::models::tag::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Dir,
}

impl FileKind {
    pub fn as_db_str(self) -> &'static str {
        match self {
            FileKind::File => "file",
            FileKind::Dir => "dir",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "file" => Some(FileKind::File),
            "dir" => Some(FileKind::Dir),
            _ => None,
        }
    }
}

/// A row in the `files` table, decorated with its tag list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: i64,
    pub workspace_id: i64,
    /// Forward-slash normalized, relative to the workspace root.
    pub path: String,
    pub name: String,
    pub size: i64,
    pub kind: FileKind,
    pub mod_time: Option<String>,
    pub created_at: String,
    pub hash: Option<String>,
    pub tags: Vec<Tag>,
}

/// A page of `files` rows, as returned by `list_files` / `search_files_by_tags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePage {
    pub total: i64,
    pub records: Vec<FileRecord>,
}

/// A single filesystem entry discovered by the scanner, not yet persisted.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub relpath: String,
    pub name: String,
    pub size: i64,
    pub kind: FileKind,
    /// RFC 3339 UTC timestamp, or `None` if unavailable.
    pub mod_time: Option<String>,
    pub created_at: String,
    /// `"{relpath}_{size}_{mtime_nanos}"` for regular files, empty for directories.
    pub identity_token: String,
}
