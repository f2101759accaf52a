//! Tag-driven renamer: composes a basename from a file's tag set under the
//! active grammar, and performs atomic on-disk renames with a reversing
//! row/file rollback on partial failure.

use std::fs;
use std::path::Path;

use crate::config::GRAMMAR_CHANGE_BATCH_SIZE;
use crate::error::{EngineError, EngineResult};
use crate::grammar;
use crate::models::{FileKind, TagGrammar};
use crate::store::Store;

fn relpath_with_new_basename(old_relpath: &str, new_basename: &str) -> String {
    match old_relpath.rfind('/') {
        Some(idx) => format!("{}/{}", &old_relpath[..idx], new_basename),
        None => new_basename.to_string(),
    }
}

/// Rename a file on disk to `new_basename`, updating its row. Rolls back the
/// filesystem rename (best-effort) if the row update fails.
pub fn rename_file(
    store: &Store,
    workspace_root: &Path,
    file_id: i64,
    new_basename: &str,
) -> EngineResult<()> {
    let new_basename = new_basename.trim();
    if new_basename.is_empty() {
        return Err(EngineError::invalid_request("new basename must not be empty"));
    }

    let file = store.get_file_by_id(file_id)?;
    let old_abs = workspace_root.join(&file.path);
    let parent = old_abs
        .parent()
        .ok_or_else(|| EngineError::invalid_request("file has no parent directory"))?;
    let new_abs = parent.join(new_basename);

    if new_abs != old_abs && new_abs.exists() {
        return Err(EngineError::TargetExists(new_abs.display().to_string()));
    }

    fs::rename(&old_abs, &new_abs)?;

    let new_relpath = relpath_with_new_basename(&file.path, new_basename);
    if let Err(err) = store.update_file_name(file_id, new_basename, &new_relpath) {
        if let Err(reverse_err) = fs::rename(&new_abs, &old_abs) {
            log::warn!(
                "rename rollback failed for file {file_id}: {reverse_err} (original error: {err})"
            );
        }
        return Err(err);
    }

    Ok(())
}

/// Recompute and apply a file's basename from its current tag set under
/// `grammar`. No-op (no I/O) if the composed name is unchanged.
pub fn rename_file_with_tags(
    store: &Store,
    workspace_root: &Path,
    file_id: i64,
    tag_grammar: &TagGrammar,
) -> EngineResult<()> {
    let file = store.get_file_by_id(file_id)?;
    let mut tag_names: Vec<String> = file.tags.iter().map(|t| t.name.clone()).collect();
    tag_names.sort_by_key(|n| n.to_lowercase());

    let new_basename = grammar::encode(&file.name, &tag_names, tag_grammar);
    if new_basename == file.name {
        return Ok(());
    }

    rename_file(store, workspace_root, file_id, &new_basename)
}

/// Re-derive filenames for every tagged regular file in a workspace after a
/// grammar change, in batches of `GRAMMAR_CHANGE_BATCH_SIZE`. Failures are
/// logged and do not abort the pass.
pub fn rerename_workspace_for_grammar_change(
    store: &mut Store,
    workspace_root: &Path,
    workspace_id: i64,
    grammar: &TagGrammar,
) -> EngineResult<()> {
    let mut offset: i64 = 0;
    loop {
        let (total, files) =
            store.list_files(workspace_id, GRAMMAR_CHANGE_BATCH_SIZE as i64, offset)?;
        if files.is_empty() {
            break;
        }
        for file in &files {
            if file.kind != FileKind::File || file.tags.is_empty() {
                continue;
            }
            if let Err(err) = rename_file_with_tags(store, workspace_root, file.id, grammar) {
                log::warn!("grammar-change rename failed for file {}: {err}", file.id);
            }
        }
        offset += files.len() as i64;
        if offset >= total {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::init_memory_db;
    use crate::models::{FileMetadata, TagGrammar};
    use std::fs;
    use tempfile::TempDir;

    fn test_store() -> Store {
        Store::new(init_memory_db().unwrap())
    }

    #[test]
    fn rename_file_updates_disk_and_row() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("photo.jpg"), b"x").unwrap();

        let mut store = test_store();
        let ws = store
            .upsert_workspace(dir.path().to_str().unwrap(), "ws")
            .unwrap();
        let session = store.begin_import(ws.id).unwrap();
        session
            .insert(&[FileMetadata {
                relpath: "photo.jpg".into(),
                name: "photo.jpg".into(),
                size: 1,
                kind: FileKind::File,
                mod_time: None,
                created_at: "2026-01-01T00:00:00Z".into(),
                identity_token: String::new(),
            }])
            .unwrap();
        session.commit().unwrap();

        let (_, files) = store.list_files(ws.id, 10, 0).unwrap();
        let file_id = files[0].id;

        rename_file(&store, dir.path(), file_id, "photo [sunset].jpg").unwrap();

        assert!(dir.path().join("photo [sunset].jpg").exists());
        assert!(!dir.path().join("photo.jpg").exists());
        let updated = store.get_file_by_id(file_id).unwrap();
        assert_eq!(updated.name, "photo [sunset].jpg");
        assert_eq!(updated.path, "photo [sunset].jpg");
    }

    #[test]
    fn rename_file_with_tags_is_noop_when_name_unchanged() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("photo [sunset].jpg"), b"x").unwrap();

        let mut store = test_store();
        let ws = store
            .upsert_workspace(dir.path().to_str().unwrap(), "ws")
            .unwrap();
        let session = store.begin_import(ws.id).unwrap();
        session
            .insert(&[FileMetadata {
                relpath: "photo [sunset].jpg".into(),
                name: "photo [sunset].jpg".into(),
                size: 1,
                kind: FileKind::File,
                mod_time: None,
                created_at: "2026-01-01T00:00:00Z".into(),
                identity_token: String::new(),
            }])
            .unwrap();
        session.commit().unwrap();

        let (_, files) = store.list_files(ws.id, 10, 0).unwrap();
        let file_id = files[0].id;
        let tag = store.get_or_create_tag("sunset").unwrap();
        store.add_tag_to_file(file_id, tag.id).unwrap();

        rename_file_with_tags(&store, dir.path(), file_id, &TagGrammar::default()).unwrap();
        assert!(dir.path().join("photo [sunset].jpg").exists());
    }

    #[test]
    fn rename_file_with_tags_renames_to_embed_new_tag() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("photo.jpg"), b"x").unwrap();

        let mut store = test_store();
        let ws = store
            .upsert_workspace(dir.path().to_str().unwrap(), "ws")
            .unwrap();
        let session = store.begin_import(ws.id).unwrap();
        session
            .insert(&[FileMetadata {
                relpath: "photo.jpg".into(),
                name: "photo.jpg".into(),
                size: 1,
                kind: FileKind::File,
                mod_time: None,
                created_at: "2026-01-01T00:00:00Z".into(),
                identity_token: String::new(),
            }])
            .unwrap();
        session.commit().unwrap();

        let (_, files) = store.list_files(ws.id, 10, 0).unwrap();
        let file_id = files[0].id;
        let tag = store.get_or_create_tag("sunset").unwrap();
        store.add_tag_to_file(file_id, tag.id).unwrap();

        rename_file_with_tags(&store, dir.path(), file_id, &TagGrammar::default()).unwrap();
        assert!(dir.path().join("photo [sunset].jpg").exists());
        assert!(!dir.path().join("photo.jpg").exists());
    }
}
