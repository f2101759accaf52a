//! Loader/writer for the `.teworkplace` workspace configuration document — an
//! external collaborator's on-disk format. The engine only needs its logical
//! schema (§6): a list of folders to (re)scan, persisted as UTF-8 JSON.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfigDocument {
    pub name: String,
    pub folders: Vec<String>,
    pub created_at: String,
    pub version: String,
}

impl WorkspaceConfigDocument {
    pub fn new(name: impl Into<String>, folders: Vec<String>) -> Self {
        WorkspaceConfigDocument {
            name: name.into(),
            folders,
            created_at: Utc::now().to_rfc3339(),
            version: "1.0".to_string(),
        }
    }
}

/// Load a `.teworkplace` document from `path`. Folders that no longer exist
/// on disk are silently dropped; if none survive, fails `ConfigEmpty`
/// (modeled here as `InvalidRequest`, the closest kind in §7's enumeration).
pub fn load(path: &Path) -> EngineResult<WorkspaceConfigDocument> {
    let text = fs::read_to_string(path)?;
    let mut doc: WorkspaceConfigDocument = serde_json::from_str(&text)?;

    doc.folders.retain(|f| Path::new(f).exists());
    if doc.folders.is_empty() {
        return Err(EngineError::invalid_request(
            "workspace config has no surviving folders (ConfigEmpty)",
        ));
    }
    if doc.name.trim().is_empty() {
        return Err(EngineError::invalid_request("workspace config name must not be empty"));
    }

    Ok(doc)
}

/// Write `doc` to `path` atomically: serialize to a temp sibling, fsync,
/// then rename over the destination, with permissions `0644`.
pub fn save(path: &Path, doc: &WorkspaceConfigDocument) -> EngineResult<()> {
    if doc.folders.is_empty() {
        return Err(EngineError::invalid_request("workspace config folders must not be empty"));
    }
    if doc.name.trim().is_empty() {
        return Err(EngineError::invalid_request("workspace config name must not be empty"));
    }

    let json = serde_json::to_string_pretty(doc)?;
    let tmp_path = tmp_sibling(path);

    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o644))?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> std::path::PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workspace".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}
