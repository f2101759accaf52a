//! Recent items commands: workspaces and folders opened recently, most
//! recent first, deduplicated by path.

use tauri::State;

use crate::config::DEFAULT_RECENT_ITEMS_LIMIT;
use crate::models::{RecentItem, RecentItemKind};
use crate::state::EngineState;

#[tauri::command]
pub fn get_recent_items(state: State<'_, EngineState>) -> Result<Vec<RecentItem>, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine
        .get_recent_items(DEFAULT_RECENT_ITEMS_LIMIT)
        .map_err(Into::into)
}

#[tauri::command]
pub fn add_recent_item(
    state: State<'_, EngineState>,
    kind: RecentItemKind,
    path: String,
    name: String,
) -> Result<(), String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.add_recent_item(kind, &path, &name).map_err(Into::into)
}

#[tauri::command]
pub fn remove_recent_item(state: State<'_, EngineState>, path: String) -> Result<(), String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.remove_recent_item(&path).map_err(Into::into)
}
