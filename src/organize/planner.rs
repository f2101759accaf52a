//! Organize planner (C5): given an ordered list of tag levels, enumerates
//! candidate files and classifies each as move / already-in-place / skip /
//! conflict.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::{ORGANIZE_ENUMERATION_BATCH_SIZE, UNNAMED_SEGMENT};
use crate::error::{EngineError, EngineResult};
use crate::grammar::sanitize_tag_name;
use crate::models::{
    FileKind, OrganizeAction, OrganizeItem, OrganizePreview, OrganizeRequest, OrganizeSummary,
    Workspace,
};
use crate::store::Store;

fn sanitize_segment_name(name: &str) -> String {
    let sanitized = sanitize_tag_name(name)
        .replace('/', "_")
        .replace('\\', "_")
        .replace(['[', ']'], "");
    if sanitized.is_empty() {
        UNNAMED_SEGMENT.to_string()
    } else {
        sanitized
    }
}

fn validate_request(store: &Store, request: &OrganizeRequest) -> EngineResult<HashMap<i64, String>> {
    if request.levels.is_empty() {
        return Err(EngineError::invalid_request("levels must not be empty"));
    }

    let mut union_ids: HashSet<i64> = HashSet::new();
    for level in &request.levels {
        if level.tag_ids.is_empty() {
            return Err(EngineError::invalid_request("a level must not be empty"));
        }
        for id in &level.tag_ids {
            if *id <= 0 {
                return Err(EngineError::invalid_request(format!("invalid tag id {id}")));
            }
            union_ids.insert(*id);
        }
    }

    let all_tags = store.list_tags()?;
    let names: HashMap<i64, String> = all_tags.into_iter().map(|t| (t.id, t.name)).collect();
    for id in &union_ids {
        if !names.contains_key(id) {
            return Err(EngineError::not_found(format!("tag {id}")));
        }
    }

    Ok(names)
}

fn build_target_relpath(
    request: &OrganizeRequest,
    tag_names: &HashMap<i64, String>,
    basename: &str,
) -> String {
    let segments: Vec<String> = request
        .levels
        .iter()
        .map(|level| {
            level
                .tag_ids
                .iter()
                .map(|id| {
                    let raw = tag_names.get(id).map(|s| s.as_str()).unwrap_or("");
                    format!("[{}]", sanitize_segment_name(raw))
                })
                .collect::<String>()
        })
        .collect();
    format!("{}/{}", segments.join("/"), basename)
}

pub fn preview_organize(store: &Store, workspace: &Workspace, request: &OrganizeRequest) -> EngineResult<OrganizePreview> {
    let tag_names = validate_request(store, request)?;
    let union_ids: HashSet<i64> = request
        .levels
        .iter()
        .flat_map(|l| l.tag_ids.iter().copied())
        .collect();

    let workspace_root = Path::new(&workspace.path);
    let mut items = Vec::new();
    let mut reserved: HashMap<String, i64> = HashMap::new();

    let mut offset: i64 = 0;
    loop {
        let (total, files) = store.list_files(
            workspace.id,
            ORGANIZE_ENUMERATION_BATCH_SIZE as i64,
            offset,
        )?;
        if files.is_empty() {
            break;
        }

        for file in &files {
            if file.kind != FileKind::File {
                continue;
            }
            let file_tag_ids: HashSet<i64> = file.tags.iter().map(|t| t.id).collect();
            if file_tag_ids.is_disjoint(&union_ids) {
                continue;
            }

            let unsatisfied = request
                .levels
                .iter()
                .find(|level| !level.tag_ids.iter().all(|id| file_tag_ids.contains(id)));

            if let Some(level) = unsatisfied {
                let missing: Vec<i64> = level
                    .tag_ids
                    .iter()
                    .filter(|id| !file_tag_ids.contains(id))
                    .copied()
                    .collect();
                items.push(OrganizeItem {
                    file_id: file.id,
                    current_path: file.path.clone(),
                    action: OrganizeAction::SkipMissingTags,
                    target_path: None,
                    missing_tag_ids: missing,
                    message: None,
                });
                continue;
            }

            let target_relpath = build_target_relpath(request, &tag_names, &file.name);

            if target_relpath == file.path {
                items.push(OrganizeItem {
                    file_id: file.id,
                    current_path: file.path.clone(),
                    action: OrganizeAction::AlreadyInPlace,
                    target_path: Some(target_relpath),
                    missing_tag_ids: Vec::new(),
                    message: None,
                });
                continue;
            }

            let target_abs = workspace_root.join(&target_relpath);
            let claimed_by_plan = reserved.contains_key(&target_relpath);
            let exists_on_disk_elsewhere = target_abs.exists() && target_abs != workspace_root.join(&file.path);

            if claimed_by_plan || exists_on_disk_elsewhere {
                items.push(OrganizeItem {
                    file_id: file.id,
                    current_path: file.path.clone(),
                    action: OrganizeAction::Conflict,
                    target_path: Some(target_relpath),
                    missing_tag_ids: Vec::new(),
                    message: Some("target path collides".to_string()),
                });
                continue;
            }

            reserved.insert(target_relpath.clone(), file.id);
            items.push(OrganizeItem {
                file_id: file.id,
                current_path: file.path.clone(),
                action: OrganizeAction::Move,
                target_path: Some(target_relpath),
                missing_tag_ids: Vec::new(),
                message: None,
            });
        }

        offset += files.len() as i64;
        if offset >= total {
            break;
        }
    }

    let summary = OrganizeSummary {
        total: items.len(),
        move_count: items.iter().filter(|i| i.action == OrganizeAction::Move).count(),
        conflict_count: items
            .iter()
            .filter(|i| i.action == OrganizeAction::Conflict)
            .count(),
        skip_count: items
            .iter()
            .filter(|i| i.action == OrganizeAction::SkipMissingTags)
            .count(),
        already_in_place: items
            .iter()
            .filter(|i| i.action == OrganizeAction::AlreadyInPlace)
            .count(),
    };

    Ok(OrganizePreview {
        items,
        summary,
        base_path: workspace.path.clone(),
    })
}
