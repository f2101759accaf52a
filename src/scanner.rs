//! Workspace scanner: walks a directory subtree and reconciles the `files`
//! table for one workspace in a single transaction.

use std::path::Path;
use std::time::UNIX_EPOCH;

use chrono::Utc;
use walkdir::{DirEntry, WalkDir};

use crate::cancellation::CancellationToken;
use crate::config::{EXCLUDED_DIR_NAMES, IMPLICIT_TAGGING_BATCH_SIZE, SCAN_BATCH_SIZE};
use crate::error::{EngineError, EngineResult};
use crate::grammar;
use crate::models::{FileKind, FileMetadata, TagGrammar, Workspace};
use crate::store::Store;

fn is_excluded(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('$') {
        return true;
    }
    let lower = name.to_lowercase();
    EXCLUDED_DIR_NAMES.contains(&lower.as_str())
}

fn to_relpath(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    Some(joined)
}

fn build_metadata(root: &Path, entry: &DirEntry) -> Option<FileMetadata> {
    let relpath = to_relpath(root, entry.path())?;
    let name = entry.file_name().to_string_lossy().into_owned();
    let metadata = match entry.metadata() {
        Ok(m) => m,
        Err(err) => {
            log::warn!("failed to read metadata for {relpath}: {err}");
            return None;
        }
    };

    let kind = if metadata.is_dir() {
        FileKind::Dir
    } else {
        FileKind::File
    };
    let size = if kind == FileKind::File {
        metadata.len() as i64
    } else {
        0
    };

    let mtime_system = metadata.modified().ok();
    let mod_time = mtime_system.map(|t| {
        let dt: chrono::DateTime<Utc> = t.into();
        dt.to_rfc3339()
    });

    let identity_token = if kind == FileKind::File {
        let nanos = mtime_system
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        format!("{relpath}_{size}_{nanos}")
    } else {
        String::new()
    };

    Some(FileMetadata {
        relpath,
        name,
        size,
        kind,
        mod_time,
        created_at: Utc::now().to_rfc3339(),
        identity_token,
    })
}

/// Walk `workspace`'s root, skipping excluded subtrees, and replace its
/// `files` rows with the current on-disk contents. Returns the number of
/// rows written. Individual unreadable entries are logged and skipped; a
/// cancellation request rolls back the whole import.
pub fn scan_workspace(
    store: &mut Store,
    workspace: &Workspace,
    token: &CancellationToken,
) -> EngineResult<i64> {
    let root = Path::new(&workspace.path);
    let session = store.begin_import(workspace.id)?;

    let mut batch: Vec<FileMetadata> = Vec::with_capacity(SCAN_BATCH_SIZE);
    let mut total: i64 = 0;

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e));

    for entry in walker {
        if token.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                log::warn!("scan: failed to read directory entry: {err}");
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        if let Some(meta) = build_metadata(root, &entry) {
            batch.push(meta);
        }

        if batch.len() >= SCAN_BATCH_SIZE {
            session.insert(&batch)?;
            total += batch.len() as i64;
            batch.clear();

            if token.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
        }
    }

    if !batch.is_empty() {
        total += batch.len() as i64;
        session.insert(&batch)?;
    }

    session.commit()?;
    Ok(total)
}

/// After a scan commits, decode each regular file's basename under `grammar`
/// and link any recovered tag names. Iterates in batches of
/// `IMPLICIT_TAGGING_BATCH_SIZE`; failures on individual files are logged and
/// do not abort the pass.
pub fn run_implicit_tagging_pass(
    store: &mut Store,
    workspace_id: i64,
    tag_grammar: &TagGrammar,
) -> EngineResult<()> {
    let mut offset: i64 = 0;
    loop {
        let (total, files) =
            store.list_files(workspace_id, IMPLICIT_TAGGING_BATCH_SIZE as i64, offset)?;
        if files.is_empty() {
            break;
        }
        for file in &files {
            if file.kind != FileKind::File {
                continue;
            }
            let tags = grammar::decode(&file.name, tag_grammar);
            if tags.is_empty() {
                continue;
            }
            if let Err(err) = store.batch_add_tags_to_file(file.id, &tags) {
                log::warn!("implicit tagging failed for file {}: {err}", file.id);
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
    use std::fs;
    use tempfile::TempDir;

    fn test_store() -> Store {
        Store::new(init_memory_db().unwrap())
    }

    #[test]
    fn scan_finds_regular_files_and_skips_excluded_dirs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/ignored.js"), b"x").unwrap();

        let mut store = test_store();
        let ws = store
            .upsert_workspace(dir.path().to_str().unwrap(), "ws")
            .unwrap();
        let token = CancellationToken::new();

        let count = scan_workspace(&mut store, &ws, &token).unwrap();
        let (total, files) = store.list_files(ws.id, 100, 0).unwrap();

        assert_eq!(count, total);
        assert!(files.iter().any(|f| f.path == "a.txt"));
        assert!(!files.iter().any(|f| f.path.contains("node_modules")));
    }

    #[test]
    fn scan_is_idempotent_on_quiescent_filesystem() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        fs::write(dir.path().join("b.jpg"), b"jpgjpg").unwrap();

        let mut store = test_store();
        let ws = store
            .upsert_workspace(dir.path().to_str().unwrap(), "ws")
            .unwrap();
        let token = CancellationToken::new();

        scan_workspace(&mut store, &ws, &token).unwrap();
        let (total_first, mut files_first) = store.list_files(ws.id, 100, 0).unwrap();

        scan_workspace(&mut store, &ws, &token).unwrap();
        let (total_second, mut files_second) = store.list_files(ws.id, 100, 0).unwrap();

        assert_eq!(total_first, total_second);
        files_first.sort_by(|a, b| a.path.cmp(&b.path));
        files_second.sort_by(|a, b| a.path.cmp(&b.path));
        let paths_first: Vec<_> = files_first.iter().map(|f| f.path.clone()).collect();
        let paths_second: Vec<_> = files_second.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths_first, paths_second);
    }

    #[test]
    fn scan_dollar_prefixed_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("$recycle_custom")).unwrap();
        fs::write(dir.path().join("$recycle_custom/x.txt"), b"x").unwrap();
        fs::write(dir.path().join("keep.txt"), b"keep").unwrap();

        let mut store = test_store();
        let ws = store
            .upsert_workspace(dir.path().to_str().unwrap(), "ws")
            .unwrap();
        let token = CancellationToken::new();

        scan_workspace(&mut store, &ws, &token).unwrap();
        let (_, files) = store.list_files(ws.id, 100, 0).unwrap();

        assert!(files.iter().any(|f| f.path == "keep.txt"));
        assert!(!files.iter().any(|f| f.path.contains("$recycle_custom")));
    }
}
