//! File commands: paginated listing, tag-filtered search, and tag-aware
//! renames against the active workspace.

use tauri::State;

use crate::models::{FilePage, FileRecord, SearchFilesByTagsParams};
use crate::state::EngineState;

#[tauri::command]
pub fn list_files(state: State<'_, EngineState>, limit: i64, offset: i64) -> Result<FilePage, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.list_files(limit, offset).map_err(Into::into)
}

#[tauri::command]
pub fn search_files_by_tags(
    state: State<'_, EngineState>,
    params: SearchFilesByTagsParams,
) -> Result<FilePage, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.search_files_by_tags(&params).map_err(Into::into)
}

#[tauri::command]
pub fn get_file(state: State<'_, EngineState>, id: i64) -> Result<FileRecord, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.get_file(id).map_err(Into::into)
}

#[tauri::command]
pub fn rename_file(
    state: State<'_, EngineState>,
    id: i64,
    new_basename: String,
) -> Result<FileRecord, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.rename_file(id, &new_basename).map_err(Into::into)
}

#[tauri::command]
pub fn rename_file_with_tags(state: State<'_, EngineState>, id: i64) -> Result<FileRecord, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.rename_file_with_tags(id).map_err(Into::into)
}
