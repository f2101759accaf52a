use serde::{Deserialize, Serialize};

/// One level of the organize hierarchy: files must carry every tag in the set
/// to be placed under the corresponding folder segment at that depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeLevel {
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeRequest {
    pub workspace_id: i64,
    pub levels: Vec<OrganizeLevel>,
}

/// How a single candidate file resolved against an organize plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizeAction {
    Move,
    AlreadyInPlace,
    SkipMissingTags,
    Conflict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeItem {
    pub file_id: i64,
    pub current_path: String,
    pub action: OrganizeAction,
    /// Populated when `action` is `Move`.
    pub target_path: Option<String>,
    /// Populated when `action` is `SkipMissingTags`: the tag ids the file lacked.
    pub missing_tag_ids: Vec<i64>,
    /// Populated when `action` is `Conflict`: a human-readable explanation.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeSummary {
    pub total: usize,
    pub move_count: usize,
    pub conflict_count: usize,
    pub skip_count: usize,
    pub already_in_place: usize,
}

/// The full result of planning an organize: a dry-run projection the caller
/// reviews before committing via `execute_organize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizePreview {
    pub items: Vec<OrganizeItem>,
    pub summary: OrganizeSummary,
    /// Absolute workspace root the planned relative paths are rooted at.
    pub base_path: String,
}

/// The result of `execute_organize`: the (re-derived) preview plus the
/// journal entry id, when at least one move was performed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeResult {
    pub preview: OrganizePreview,
    pub operation_id: Option<i64>,
}

/// The result of `undo_organize`: how many of the journaled moves reversed
/// cleanly. The journal entry survives iff `failures > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizeUndoResult {
    pub successes: usize,
    pub failures: usize,
}
