//! Tag CRUD and file↔tag edge commands.

use tauri::State;

use crate::models::{FileRecord, Tag};
use crate::state::EngineState;

#[tauri::command]
pub fn list_tags(state: State<'_, EngineState>) -> Result<Vec<Tag>, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.list_tags().map_err(Into::into)
}

#[tauri::command]
pub fn create_tag(
    state: State<'_, EngineState>,
    name: String,
    color: String,
    parent: Option<i64>,
) -> Result<Tag, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.create_tag(&name, &color, parent).map_err(Into::into)
}

#[tauri::command]
pub fn delete_tag(state: State<'_, EngineState>, id: i64) -> Result<(), String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.delete_tag(id).map_err(Into::into)
}

#[tauri::command]
pub fn update_tag_color(state: State<'_, EngineState>, id: i64, color: String) -> Result<(), String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.update_tag_color(id, &color).map_err(Into::into)
}

#[tauri::command]
pub fn add_tag_to_file(
    state: State<'_, EngineState>,
    file_id: i64,
    tag_id: i64,
) -> Result<FileRecord, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.add_tag_to_file(file_id, tag_id).map_err(Into::into)
}

#[tauri::command]
pub fn remove_tag_from_file(
    state: State<'_, EngineState>,
    file_id: i64,
    tag_id: i64,
) -> Result<FileRecord, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.remove_tag_from_file(file_id, tag_id).map_err(Into::into)
}

#[tauri::command]
pub fn clear_all_tags_from_file(
    state: State<'_, EngineState>,
    file_id: i64,
) -> Result<FileRecord, String> {
    let engine = state.lock().map_err(|e| e.to_string())?;
    engine.clear_all_tags_from_file(file_id).map_err(Into::into)
}
