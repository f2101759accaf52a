//! The engine core: a plain, `tauri`-independent façade over the store,
//! scanner, grammar, renamer, and organize planner/executor. Every operation
//! named in §6 of the spec is a method here; the `commands` module is a thin
//! `#[tauri::command]` wrapper that maps `EngineError` to `String`.
//!
//! The tag grammar is process-wide mutable state (§9 design notes): loaded
//! once from the store, updated atomically by `update_settings`, and
//! snapshotted into a local `TagGrammar` at the top of every operation that
//! reads it, so a concurrent settings change can't be observed mid-operation.

use std::path::{Path, PathBuf};

use crate::cancellation::CancellationToken;
use crate::config::SETTINGS_KEY_APP_SETTINGS;
use crate::db::connection::init_db;
use crate::error::{EngineError, EngineResult};
use crate::grammar;
use crate::models::{
    AppSettings, FilePage, FileRecord, OrganizeRequest, OrganizeResult, OrganizeUndoResult,
    RecentItem, RecentItemKind, ScanResult, SearchFilesByTagsParams, Tag, TagFormat, Workspace,
};
use crate::organize;
use crate::renamer;
use crate::scanner;
use crate::store::Store;

pub struct Engine {
    store: Store,
    active_workspace: Option<Workspace>,
    settings: AppSettings,
}

impl Engine {
    /// Open (creating if necessary) the store at `db_path` and load the
    /// cached tag grammar, defaulting if none has been saved yet.
    pub fn open(db_path: PathBuf) -> EngineResult<Self> {
        let conn = init_db(db_path)?;
        Self::with_store(Store::new(conn))
    }

    pub fn with_store(store: Store) -> EngineResult<Self> {
        let settings = load_settings(&store)?;
        Ok(Engine {
            store,
            active_workspace: None,
            settings,
        })
    }

    fn active_workspace(&self) -> EngineResult<&Workspace> {
        self.active_workspace
            .as_ref()
            .ok_or_else(|| EngineError::not_initialized("no active workspace"))
    }

    // ---- Workspace ---------------------------------------------------

    pub fn scan(&mut self, root_path: &str) -> EngineResult<ScanResult> {
        let root = Path::new(root_path);
        if !root.is_dir() {
            return Err(EngineError::invalid_request(format!(
                "{root_path} is not a directory"
            )));
        }
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root_path.to_string());

        let workspace = self.store.upsert_workspace(root_path, &name)?;
        let token = CancellationToken::new();
        let files_scanned = scanner::scan_workspace(&mut self.store, &workspace, &token)?;
        scanner::run_implicit_tagging_pass(&mut self.store, workspace.id, &self.settings.tag_rule)?;

        self.store
            .add_recent_item(RecentItemKind::Workspace, &workspace.path, &workspace.name)?;
        self.active_workspace = Some(workspace.clone());

        Ok(ScanResult {
            workspace,
            files_scanned,
        })
    }

    pub fn list_workspaces(&self) -> EngineResult<Vec<Workspace>> {
        self.store.list_workspaces()
    }

    pub fn remove_workspace(&mut self, id: i64) -> EngineResult<()> {
        self.store.remove_workspace(id)?;
        if self.active_workspace.as_ref().is_some_and(|w| w.id == id) {
            self.active_workspace = None;
        }
        Ok(())
    }

    pub fn set_active_workspace(&mut self, id: i64) -> EngineResult<Workspace> {
        let workspace = self.store.get_workspace(id)?;
        self.active_workspace = Some(workspace.clone());
        Ok(workspace)
    }

    // ---- Files ---------------------------------------------------------

    pub fn list_files(&self, limit: i64, offset: i64) -> EngineResult<FilePage> {
        let workspace = self.active_workspace()?;
        let (total, records) = self.store.list_files(workspace.id, limit, offset)?;
        Ok(FilePage { total, records })
    }

    pub fn search_files_by_tags(&self, params: &SearchFilesByTagsParams) -> EngineResult<FilePage> {
        let workspace = self.active_workspace()?;
        let (total, records) = self.store.list_files_by_tags(
            workspace.id,
            &params.tag_ids,
            &params.folder_relpath,
            params.include_subfolders,
            params.limit,
            params.offset,
        )?;
        Ok(FilePage { total, records })
    }

    pub fn get_file(&self, id: i64) -> EngineResult<FileRecord> {
        self.store.get_file_by_id(id)
    }

    pub fn rename_file(&self, id: i64, new_basename: &str) -> EngineResult<FileRecord> {
        let workspace = self.active_workspace()?;
        renamer::rename_file(&self.store, Path::new(&workspace.path), id, new_basename)?;
        self.store.get_file_by_id(id)
    }

    pub fn rename_file_with_tags(&self, id: i64) -> EngineResult<FileRecord> {
        let workspace = self.active_workspace()?;
        renamer::rename_file_with_tags(
            &self.store,
            Path::new(&workspace.path),
            id,
            &self.settings.tag_rule,
        )?;
        self.store.get_file_by_id(id)
    }

    // ---- Tags ------------------------------------------------------------

    pub fn list_tags(&self) -> EngineResult<Vec<Tag>> {
        self.store.list_tags()
    }

    pub fn create_tag(&self, name: &str, color: &str, parent_id: Option<i64>) -> EngineResult<Tag> {
        self.store.create_tag(name, color, parent_id)
    }

    pub fn delete_tag(&self, id: i64) -> EngineResult<()> {
        self.store.delete_tag(id)
    }

    pub fn update_tag_color(&self, id: i64, color: &str) -> EngineResult<()> {
        self.store.update_tag_color(id, color)
    }

    /// Add an edge, then re-derive the file's name under the active grammar.
    /// A rename failure here does not undo the tag mutation (§4.4); it is
    /// logged as a warning and the (now-tagged) row is still returned.
    pub fn add_tag_to_file(&self, file_id: i64, tag_id: i64) -> EngineResult<FileRecord> {
        self.store.add_tag_to_file(file_id, tag_id)?;
        self.rename_after_tag_mutation(file_id)
    }

    pub fn remove_tag_from_file(&self, file_id: i64, tag_id: i64) -> EngineResult<FileRecord> {
        self.store.remove_tag_from_file(file_id, tag_id)?;
        self.rename_after_tag_mutation(file_id)
    }

    pub fn clear_all_tags_from_file(&self, file_id: i64) -> EngineResult<FileRecord> {
        self.store.clear_all_tags(file_id)?;
        self.rename_after_tag_mutation(file_id)
    }

    fn rename_after_tag_mutation(&self, file_id: i64) -> EngineResult<FileRecord> {
        if let Some(workspace) = &self.active_workspace {
            if let Err(err) = renamer::rename_file_with_tags(
                &self.store,
                Path::new(&workspace.path),
                file_id,
                &self.settings.tag_rule,
            ) {
                log::warn!("rename after tag mutation failed for file {file_id}: {err}");
            }
        }
        self.store.get_file_by_id(file_id)
    }

    // ---- Settings --------------------------------------------------------

    pub fn get_settings(&self) -> AppSettings {
        self.settings.clone()
    }

    /// Validate, persist, and adopt `settings`, then trigger the
    /// workspace-wide re-rename pass over the active workspace (if any).
    pub fn update_settings(&mut self, mut settings: AppSettings) -> EngineResult<()> {
        if settings.tag_rule.format == TagFormat::Custom {
            let custom = settings
                .tag_rule
                .custom_format
                .as_ref()
                .ok_or_else(|| EngineError::invalid_request("custom format requires customFormat"))?;
            let sanitized_prefix = grammar::sanitize_tag_name(&custom.prefix);
            let sanitized_suffix = grammar::sanitize_tag_name(&custom.suffix);
            let sanitized_separator = grammar::sanitize_tag_name(&custom.separator);
            if sanitized_prefix != custom.prefix
                || sanitized_suffix != custom.suffix
                || sanitized_separator != custom.separator
            {
                log::warn!("custom tag grammar strings were sanitized on update");
            }
            settings.tag_rule.custom_format = Some(crate::models::settings::CustomFormat {
                prefix: sanitized_prefix,
                suffix: sanitized_suffix,
                separator: sanitized_separator,
            });
        }

        let payload = serde_json::to_string(&settings)?;
        self.store.set_setting(SETTINGS_KEY_APP_SETTINGS, &payload)?;
        self.settings = settings;

        if let Some(workspace) = self.active_workspace.clone() {
            renamer::rerename_workspace_for_grammar_change(
                &mut self.store,
                Path::new(&workspace.path),
                workspace.id,
                &self.settings.tag_rule,
            )?;
        }

        Ok(())
    }

    // ---- Organize --------------------------------------------------------

    pub fn preview_organize(&self, request: &OrganizeRequest) -> EngineResult<crate::models::OrganizePreview> {
        let workspace = self.active_workspace()?;
        organize::preview_organize(&self.store, workspace, request)
    }

    pub fn execute_organize(&mut self, request: &OrganizeRequest) -> EngineResult<OrganizeResult> {
        let workspace = self.active_workspace()?.clone();
        let outcome = organize::execute_organize(&mut self.store, &workspace, request)?;
        Ok(OrganizeResult {
            preview: outcome.preview,
            operation_id: outcome.operation_id,
        })
    }

    pub fn undo_organize(&mut self, operation_id: i64) -> EngineResult<OrganizeUndoResult> {
        let workspace = self.active_workspace()?.clone();
        let outcome = organize::undo_organize(&mut self.store, &workspace, operation_id)?;
        Ok(OrganizeUndoResult {
            successes: outcome.successes,
            failures: outcome.failures,
        })
    }

    // ---- Recent items ------------------------------------------------

    pub fn get_recent_items(&self, limit: i64) -> EngineResult<Vec<RecentItem>> {
        self.store.get_recent_items(limit)
    }

    pub fn add_recent_item(&self, kind: RecentItemKind, path: &str, name: &str) -> EngineResult<()> {
        self.store.add_recent_item(kind, path, name)
    }

    pub fn remove_recent_item(&self, path: &str) -> EngineResult<()> {
        self.store.remove_recent_item(path)
    }
}

fn load_settings(store: &Store) -> EngineResult<AppSettings> {
    let raw = store.get_setting(SETTINGS_KEY_APP_SETTINGS)?;
    if raw.is_empty() {
        return Ok(AppSettings::default());
    }
    serde_json::from_str(&raw).map_err(EngineError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::init_memory_db;
    use crate::models::OrganizeLevel;
    use std::fs;
    use tempfile::TempDir;

    fn test_engine() -> Engine {
        Engine::with_store(Store::new(init_memory_db().unwrap())).unwrap()
    }

    #[test]
    fn scan_then_list_files_scenario_a() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"x").unwrap();
        fs::write(dir.path().join("b.jpg"), b"y").unwrap();

        let mut engine = test_engine();
        engine.scan(dir.path().to_str().unwrap()).unwrap();

        let page = engine.list_files(200, 0).unwrap();
        assert_eq!(page.total, 2);
        assert!(page.records.iter().all(|f| f.tags.is_empty()));
        let mut names: Vec<_> = page.records.iter().map(|f| f.path.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["a.txt".to_string(), "b.jpg".to_string()]);
    }

    #[test]
    fn scan_induces_filename_tags_scenario_b() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("report [draft, 2025].pdf"), b"x").unwrap();

        let mut engine = test_engine();
        engine.scan(dir.path().to_str().unwrap()).unwrap();

        let page = engine.list_files(200, 0).unwrap();
        assert_eq!(page.records.len(), 1);
        let mut names: Vec<_> = page.records[0].tags.iter().map(|t| t.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["2025".to_string(), "draft".to_string()]);
        assert_eq!(page.records[0].path, "report [draft, 2025].pdf");
    }

    #[test]
    fn add_tag_renames_on_disk_scenario_c() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("photo.jpg"), b"x").unwrap();

        let mut engine = test_engine();
        engine.scan(dir.path().to_str().unwrap()).unwrap();
        let file_id = engine.list_files(10, 0).unwrap().records[0].id;
        let tag = engine.create_tag("sunset", "", None).unwrap();

        let updated = engine.add_tag_to_file(file_id, tag.id).unwrap();
        assert_eq!(updated.name, "photo [sunset].jpg");
        assert!(dir.path().join("photo [sunset].jpg").exists());
        assert!(!dir.path().join("photo.jpg").exists());
    }

    #[test]
    fn grammar_switch_renames_workspace_scenario_d() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("photo [sunset].jpg"), b"x").unwrap();

        let mut engine = test_engine();
        engine.scan(dir.path().to_str().unwrap()).unwrap();

        let mut settings = engine.get_settings();
        settings.tag_rule.format = TagFormat::Parentheses;
        settings.tag_rule.position = crate::models::settings::TagPosition::Prefix;
        settings.tag_rule.grouping = crate::models::settings::TagGrouping::Individual;
        settings.tag_rule.add_spaces = true;
        engine.update_settings(settings).unwrap();

        assert!(dir.path().join("(sunset) photo.jpg").exists());
        assert!(!dir.path().join("photo [sunset].jpg").exists());
    }

    #[test]
    fn organize_conflict_then_execute_is_rejected_scenario_e() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("[2025]/[draft]")).unwrap();
        // Same basename at both the occupant's current path and a.pdf's
        // organize target, so a.pdf's move genuinely collides on disk.
        fs::write(dir.path().join("[2025]/[draft]/a.pdf"), b"occupant").unwrap();
        fs::write(dir.path().join("a.pdf"), b"x").unwrap();

        let mut engine = test_engine();
        engine.scan(dir.path().to_str().unwrap()).unwrap();

        let year = engine.create_tag("2025", "", None).unwrap();
        let draft = engine.create_tag("draft", "", None).unwrap();
        for file in engine.list_files(10, 0).unwrap().records {
            engine.add_tag_to_file(file.id, year.id).unwrap();
            engine.add_tag_to_file(file.id, draft.id).unwrap();
        }

        let request = OrganizeRequest {
            workspace_id: engine.active_workspace().unwrap().id,
            levels: vec![
                OrganizeLevel { tag_ids: vec![year.id] },
                OrganizeLevel { tag_ids: vec![draft.id] },
            ],
        };

        let preview = engine.preview_organize(&request).unwrap();
        assert_eq!(preview.summary.conflict_count, 1);
        assert_eq!(preview.summary.already_in_place, 1);

        let result = engine.execute_organize(&request);
        assert!(matches!(result, Err(EngineError::ConflictInPlan)));
    }

    #[test]
    fn organize_then_undo_round_trips_scenario_f() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.pdf"), b"x").unwrap();

        let mut engine = test_engine();
        engine.scan(dir.path().to_str().unwrap()).unwrap();

        let year = engine.create_tag("2025", "", None).unwrap();
        let draft = engine.create_tag("draft", "", None).unwrap();
        let file_id = engine.list_files(10, 0).unwrap().records[0].id;
        engine.add_tag_to_file(file_id, year.id).unwrap();
        engine.add_tag_to_file(file_id, draft.id).unwrap();

        let request = OrganizeRequest {
            workspace_id: engine.active_workspace().unwrap().id,
            levels: vec![
                OrganizeLevel { tag_ids: vec![year.id] },
                OrganizeLevel { tag_ids: vec![draft.id] },
            ],
        };

        let result = engine.execute_organize(&request).unwrap();
        let operation_id = result.operation_id.unwrap();
        assert!(dir.path().join("[2025]/[draft]/x.pdf").exists());

        let undo = engine.undo_organize(operation_id).unwrap();
        assert_eq!(undo.failures, 0);
        assert!(dir.path().join("x.pdf").exists());
        assert!(!dir.path().join("[2025]/[draft]/x.pdf").exists());
    }
}
