use serde::{Deserialize, Serialize};

use super::workspace::Workspace;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub workspace: Workspace,
    pub files_scanned: i64,
}
