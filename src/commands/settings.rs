//! App settings commands: reading and updating the tag grammar.
//!
//! Updating settings has a side effect per §4.4: a workspace-wide re-rename
//! pass over the active workspace's tagged files.

use tauri::State;

use crate::models::AppSettings;
use crate::state::EngineState;

#[tauri::command]
pub fn get_settings(state: State<'_, EngineState>) -> Result<AppSettings, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    Ok(engine.get_settings())
}

/// Triggers the grammar-change re-rename pass, which walks every tagged file
/// in the active workspace; run it on a blocking thread like `scan`.
#[tauri::command]
pub async fn update_settings(
    state: State<'_, EngineState>,
    settings: AppSettings,
) -> Result<(), String> {
    let engine_state = state.inner().clone();
    tokio::task::spawn_blocking(move || {
        let mut engine = engine_state.lock().map_err(|e| e.to_string())?;
        engine.update_settings(settings).map_err(Into::into)
    })
    .await
    .map_err(|e| format!("update_settings task panicked: {e}"))?
}
