//! Workspace commands: scanning a directory into the store, and switching
//! which workspace subsequent file/tag/organize commands operate against.

use tauri::State;

use crate::models::{ScanResult, Workspace};
use crate::state::EngineState;

/// Scanning walks the whole subtree and can take a while on large
/// workspaces; run it on a blocking thread so the async runtime isn't
/// starved (mirrors the pack's own `cmd_scan` convention).
#[tauri::command]
pub async fn scan(state: State<'_, EngineState>, root_path: String) -> Result<ScanResult, String> {
    let engine_state = state.inner().clone();
    tokio::task::spawn_blocking(move || {
        let mut engine = engine_state.lock().map_err(|e| e.to_string())?;
        engine.scan(&root_path).map_err(Into::into)
    })
    .await
    .map_err(|e| format!("scan task panicked: {e}"))?
}

#[tauri::command]
pub fn list_workspaces(state: State<'_, EngineState>) -> Result<Vec<Workspace>, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.list_workspaces().map_err(Into::into)
}

#[tauri::command]
pub fn remove_workspace(state: State<'_, EngineState>, id: i64) -> Result<(), String> {
    let mut engine = state.lock().map_err(|e| e.to_string())?;
    engine.remove_workspace(id).map_err(Into::into)
}

#[tauri::command]
pub fn set_active_workspace(state: State<'_, EngineState>, id: i64) -> Result<Workspace, String> {
    let mut engine = state.lock().map_err(|e| e.to_string())?;
    engine.set_active_workspace(id).map_err(Into::into)
}
