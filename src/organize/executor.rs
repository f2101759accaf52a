//! Organize executor + undo (C6): executes a planned set of moves
//! transactionally against the filesystem and store, journaling the result
//! so it can later be undone in strict reverse order.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    OrganizeAction, OrganizeMove, OrganizeOperationPayload, OrganizePreview, OrganizeRequest,
    OperationKind, Workspace,
};
use crate::organize::planner::preview_organize;
use crate::store::Store;

pub struct ExecuteOutcome {
    /// The plan that was actually executed, computed before any move was
    /// made. Reflects what happened on disk, unlike a preview re-derived
    /// after the fact (which would see every moved file already in place).
    pub preview: OrganizePreview,
    pub operation_id: Option<i64>,
}

fn reverse_move(store: &Store, workspace_root: &Path, mv: &OrganizeMove) {
    let from_abs = workspace_root.join(&mv.from);
    let to_abs = workspace_root.join(&mv.to);
    if let Some(parent) = from_abs.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            log::warn!("rollback: failed to recreate parent dir for {}: {err}", mv.from);
        }
    }
    if let Err(err) = fs::rename(&to_abs, &from_abs) {
        log::warn!("rollback: failed to reverse move {} -> {}: {err}", mv.to, mv.from);
        return;
    }
    if let Err(err) = store.update_file_name(
        mv.file_id,
        from_abs
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default(),
        &mv.from,
    ) {
        log::warn!("rollback: failed to restore row for file {}: {err}", mv.file_id);
    }
}

/// Rebuild the plan fresh, reject if it contains conflicts, then execute
/// every `move` item in plan order, rolling back on the first failure.
pub fn execute_organize(
    store: &mut Store,
    workspace: &Workspace,
    request: &OrganizeRequest,
) -> EngineResult<ExecuteOutcome> {
    let preview = preview_organize(store, workspace, request)?;
    if preview.summary.conflict_count > 0 {
        return Err(EngineError::ConflictInPlan);
    }
    if preview.summary.move_count == 0 {
        return Ok(ExecuteOutcome {
            preview,
            operation_id: None,
        });
    }

    let workspace_root = Path::new(&workspace.path);
    let mut executed: Vec<OrganizeMove> = Vec::new();

    for item in preview.items.iter().filter(|i| i.action == OrganizeAction::Move) {
        let target_path = item
            .target_path
            .clone()
            .expect("move items always carry a target_path");

        let result = (|| -> EngineResult<()> {
            let current = store.get_file_by_id(item.file_id)?;
            if current.path != item.current_path {
                return Err(EngineError::PlanStale(format!(
                    "file {} moved since plan was built",
                    item.file_id
                )));
            }

            let from_abs = workspace_root.join(&current.path);
            let to_abs = workspace_root.join(&target_path);
            if let Some(parent) = to_abs.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&from_abs, &to_abs)?;

            let new_basename = to_abs
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            store.update_file_name(item.file_id, new_basename, &target_path)?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                executed.push(OrganizeMove {
                    file_id: item.file_id,
                    from: item.current_path.clone(),
                    to: target_path,
                });
            }
            Err(err) => {
                for mv in executed.iter().rev() {
                    reverse_move(store, workspace_root, mv);
                }
                return Err(err);
            }
        }
    }

    let payload = OrganizeOperationPayload {
        workspace_id: workspace.id,
        moves: executed,
    };
    let payload_text = serde_json::to_string(&payload)?;
    let operation_id = store.insert_operation(OperationKind::Organize, &payload_text)?;

    Ok(ExecuteOutcome {
        preview,
        operation_id: Some(operation_id),
    })
}

pub struct UndoOutcome {
    pub successes: usize,
    pub failures: usize,
}

/// Reverse a previously executed organize operation in strict reverse order.
/// Deletes the journal entry only if every move reversed cleanly.
pub fn undo_organize(
    store: &mut Store,
    workspace: &Workspace,
    operation_id: i64,
) -> EngineResult<UndoOutcome> {
    let operation = store.get_operation(operation_id)?;
    if operation.kind != OperationKind::Organize {
        return Err(EngineError::invalid_request(format!(
            "operation {operation_id} is not an organize entry"
        )));
    }

    let payload: OrganizeOperationPayload = serde_json::from_str(&operation.payload)?;
    if payload.workspace_id != workspace.id {
        return Err(EngineError::WorkspaceMismatch(format!(
            "operation {operation_id} belongs to workspace {}",
            payload.workspace_id
        )));
    }

    let workspace_root = Path::new(&workspace.path);
    let mut successes = 0usize;
    let mut failures = 0usize;

    for mv in payload.moves.iter().rev() {
        let from_abs = workspace_root.join(&mv.from);
        let to_abs = workspace_root.join(&mv.to);

        let outcome = (|| -> EngineResult<()> {
            if let Some(parent) = from_abs.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&to_abs, &from_abs)?;
            let basename = from_abs
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            store.update_file_name(mv.file_id, basename, &mv.from)?;
            Ok(())
        })();

        match outcome {
            Ok(()) => successes += 1,
            Err(err) => {
                log::warn!("undo: failed to reverse move for file {}: {err}", mv.file_id);
                failures += 1;
            }
        }
    }

    if failures == 0 {
        store.delete_operation(operation_id)?;
    }

    Ok(UndoOutcome { successes, failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::init_memory_db;
    use crate::models::{FileKind, FileMetadata, OrganizeLevel};
    use std::fs;
    use tempfile::TempDir;

    fn test_store() -> Store {
        Store::new(init_memory_db().unwrap())
    }

    fn seed_file(store: &mut Store, workspace_id: i64, relpath: &str) -> i64 {
        let session = store.begin_import(workspace_id).unwrap();
        session
            .insert(&[FileMetadata {
                relpath: relpath.into(),
                name: relpath.into(),
                size: 1,
                kind: FileKind::File,
                mod_time: None,
                created_at: "2026-01-01T00:00:00Z".into(),
                identity_token: String::new(),
            }])
            .unwrap();
        session.commit().unwrap();
        let (_, files) = store.list_files(workspace_id, 10, 0).unwrap();
        files.iter().find(|f| f.path == relpath).unwrap().id
    }

    #[test]
    fn execute_then_undo_round_trips() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.pdf"), b"x").unwrap();

        let mut store = test_store();
        let ws = store
            .upsert_workspace(dir.path().to_str().unwrap(), "ws")
            .unwrap();
        let file_id = seed_file(&mut store, ws.id, "x.pdf");

        let year = store.get_or_create_tag("2025").unwrap();
        let draft = store.get_or_create_tag("draft").unwrap();
        store.add_tag_to_file(file_id, year.id).unwrap();
        store.add_tag_to_file(file_id, draft.id).unwrap();

        let request = OrganizeRequest {
            workspace_id: ws.id,
            levels: vec![
                OrganizeLevel { tag_ids: vec![year.id] },
                OrganizeLevel { tag_ids: vec![draft.id] },
            ],
        };

        let outcome = execute_organize(&mut store, &ws, &request).unwrap();
        assert!(outcome.operation_id.is_some());
        assert!(dir.path().join("[2025]/[draft]/x.pdf").exists());
        assert!(!dir.path().join("x.pdf").exists());

        let undo = undo_organize(&mut store, &ws, outcome.operation_id.unwrap()).unwrap();
        assert_eq!(undo.failures, 0);
        assert!(dir.path().join("x.pdf").exists());
        assert!(!dir.path().join("[2025]/[draft]/x.pdf").exists());

        assert!(store.get_operation(outcome.operation_id.unwrap()).is_err());
    }

    #[test]
    fn execute_rejects_when_plan_has_conflicts() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("[2025]/[draft]")).unwrap();
        // Occupies a.pdf's own organize target, not b.pdf's, so the
        // collision is a genuine one: a.pdf wants to move here too.
        fs::write(dir.path().join("[2025]/[draft]/a.pdf"), b"occupant").unwrap();
        fs::write(dir.path().join("a.pdf"), b"x").unwrap();

        let mut store = test_store();
        let ws = store
            .upsert_workspace(dir.path().to_str().unwrap(), "ws")
            .unwrap();
        let a_id = seed_file(&mut store, ws.id, "a.pdf");

        let year = store.get_or_create_tag("2025").unwrap();
        let draft = store.get_or_create_tag("draft").unwrap();
        store.add_tag_to_file(a_id, year.id).unwrap();
        store.add_tag_to_file(a_id, draft.id).unwrap();

        let request = OrganizeRequest {
            workspace_id: ws.id,
            levels: vec![
                OrganizeLevel { tag_ids: vec![year.id] },
                OrganizeLevel { tag_ids: vec![draft.id] },
            ],
        };

        let result = execute_organize(&mut store, &ws, &request);
        assert!(matches!(result, Err(EngineError::ConflictInPlan)));
    }
}
