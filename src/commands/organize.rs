//! Organize planning, execution, and undo commands.

use tauri::State;

use crate::models::{OrganizePreview, OrganizeRequest, OrganizeResult, OrganizeUndoResult};
use crate::state::EngineState;

#[tauri::command]
pub fn preview_organize(
    state: State<'_, EngineState>,
    request: OrganizeRequest,
) -> Result<OrganizePreview, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.preview_organize(&request).map_err(Into::into)
}

/// Executing a plan performs one filesystem rename per move; run it on a
/// blocking thread like `scan` so a large organize doesn't stall the runtime.
#[tauri::command]
pub async fn execute_organize(
    state: State<'_, EngineState>,
    request: OrganizeRequest,
) -> Result<OrganizeResult, String> {
    let engine_state = state.inner().clone();
    tokio::task::spawn_blocking(move || {
        let mut engine = engine_state.lock().map_err(|e| e.to_string())?;
        engine.execute_organize(&request).map_err(Into::into)
    })
    .await
    .map_err(|e| format!("execute_organize task panicked: {e}"))?
}

#[tauri::command]
pub fn undo_organize(
    state: State<'_, EngineState>,
    operation_id: i64,
) -> Result<OrganizeUndoResult, String> {
    let mut engine = state.lock().map_err(|e| e.to_string())?;
    engine.undo_organize(operation_id).map_err(Into::into)
}
