use std::sync::{Arc, Mutex};

use tauri::Manager;

pub mod cancellation;
mod commands;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod models;
pub mod organize;
pub mod renamer;
pub mod scanner;
mod state;
pub mod store;
pub mod workspace_config;

use engine::Engine;
use state::EngineState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            let app_data_dir = app
                .path()
                .app_data_dir()
                .expect("failed to resolve app data directory");
            let db_path = db::connection::get_db_path(app_data_dir);
            let engine = Engine::open(db_path).expect("failed to open metadata store");
            let engine_state: EngineState = Arc::new(Mutex::new(engine));
            app.manage(engine_state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Workspace
            commands::workspace::scan,
            commands::workspace::list_workspaces,
            commands::workspace::remove_workspace,
            commands::workspace::set_active_workspace,
            // Files
            commands::files::list_files,
            commands::files::search_files_by_tags,
            commands::files::get_file,
            commands::files::rename_file,
            commands::files::rename_file_with_tags,
            // Tags
            commands::tags::list_tags,
            commands::tags::create_tag,
            commands::tags::delete_tag,
            commands::tags::update_tag_color,
            commands::tags::add_tag_to_file,
            commands::tags::remove_tag_from_file,
            commands::tags::clear_all_tags_from_file,
            // Settings
            commands::settings::get_settings,
            commands::settings::update_settings,
            // Organize
            commands::organize::preview_organize,
            commands::organize::execute_organize,
            commands::organize::undo_organize,
            // Recent items
            commands::recent::get_recent_items,
            commands::recent::add_recent_item,
            commands::recent::remove_recent_item,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
