//! The metadata store (workspaces, files, tags, edges, journal, settings,
//! recent items) backed by a single `rusqlite::Connection`.
//!
//! Exactly one `Store` is expected to be open against a given database file
//! at a time; the single-writer discipline is enforced by the caller (the
//! Tauri state layer holds it behind a `Mutex`), not by this module.

use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::config::{DEFAULT_LIST_LIMIT, DEFAULT_TAG_COLOR, MAX_LIST_LIMIT, MIN_LIST_LIMIT};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    FileKind, FileMetadata, FileRecord, Operation, OperationKind, RecentItem, RecentItemKind, Tag,
    Workspace,
};

pub struct Store {
    conn: Connection,
}

fn clamp_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_LIST_LIMIT
    } else {
        limit.clamp(MIN_LIST_LIMIT, MAX_LIST_LIMIT)
    }
}

fn clamp_offset(offset: i64) -> i64 {
    offset.max(0)
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Store { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ---- Workspaces ----------------------------------------------------

    pub fn upsert_workspace(&self, path: &str, name: &str) -> EngineResult<Workspace> {
        self.conn.execute(
            "INSERT INTO workspaces (path, name) VALUES (?1, ?2)
             ON CONFLICT(path) DO UPDATE SET name = excluded.name",
            params![path, name],
        )?;
        self.conn
            .query_row(
                "SELECT id, path, name, created_at FROM workspaces WHERE path = ?1",
                params![path],
                |row| {
                    Ok(Workspace {
                        id: row.get(0)?,
                        path: row.get(1)?,
                        name: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .map_err(EngineError::from)
    }

    pub fn get_workspace(&self, id: i64) -> EngineResult<Workspace> {
        self.conn
            .query_row(
                "SELECT id, path, name, created_at FROM workspaces WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Workspace {
                        id: row.get(0)?,
                        path: row.get(1)?,
                        name: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .map_err(EngineError::from)
    }

    pub fn list_workspaces(&self) -> EngineResult<Vec<Workspace>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, path, name, created_at FROM workspaces ORDER BY id ASC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Workspace {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn remove_workspace(&self, id: i64) -> EngineResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM workspaces WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(EngineError::not_found(format!("workspace {id}")));
        }
        Ok(())
    }

    // ---- File import session --------------------------------------------

    /// Opens a transaction that clears and re-populates `files` for
    /// `workspace_id`. The caller streams batches, then either `commit()`s or
    /// drops the session, which rolls back the whole transaction.
    pub fn begin_import(&mut self, workspace_id: i64) -> EngineResult<ImportSession<'_>> {
        let txn = self.conn.transaction()?;
        txn.execute(
            "DELETE FROM files WHERE workspace_id = ?1",
            params![workspace_id],
        )?;
        Ok(ImportSession {
            txn,
            workspace_id,
        })
    }

    // ---- Files -----------------------------------------------------------

    pub fn list_files(
        &self,
        workspace_id: i64,
        limit: i64,
        offset: i64,
    ) -> EngineResult<(i64, Vec<FileRecord>)> {
        let limit = clamp_limit(limit);
        let offset = clamp_offset(offset);

        let total: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM files WHERE workspace_id = ?1",
            params![workspace_id],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT id, workspace_id, path, name, size, kind, mod_time, created_at, hash
             FROM files WHERE workspace_id = ?1 ORDER BY id ASC LIMIT ?2 OFFSET ?3",
        )?;
        let mut records = stmt
            .query_map(params![workspace_id, limit, offset], row_to_file_stub)?
            .collect::<Result<Vec<_>, _>>()?;

        for record in &mut records {
            record.tags = self.tags_for_file(record.id)?;
        }

        Ok((total, records))
    }

    /// Files carrying every id in `tag_ids` (set intersection), optionally
    /// restricted to a folder (direct children, or the whole subtree when
    /// `include_subfolders` is set). Folder matching is done in Rust since the
    /// "direct child vs descendant" distinction does not map cleanly to SQL
    /// `LIKE`.
    pub fn list_files_by_tags(
        &self,
        workspace_id: i64,
        tag_ids: &[i64],
        folder_relpath: &str,
        include_subfolders: bool,
        limit: i64,
        offset: i64,
    ) -> EngineResult<(i64, Vec<FileRecord>)> {
        if tag_ids.is_empty() {
            return Err(EngineError::invalid_request("tag_ids must not be empty"));
        }
        let limit = clamp_limit(limit);
        let offset = clamp_offset(offset);

        let placeholders = tag_ids
            .iter()
            .map(|_| "?")
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT f.id, f.workspace_id, f.path, f.name, f.size, f.kind, f.mod_time,
                    f.created_at, f.hash
             FROM files f
             WHERE f.workspace_id = ? AND f.kind = 'file' AND f.id IN (
                 SELECT file_id FROM file_tags WHERE tag_id IN ({placeholders})
                 GROUP BY file_id HAVING COUNT(DISTINCT tag_id) = ?
             )
             ORDER BY f.id ASC"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut query_params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        query_params.push(Box::new(workspace_id));
        for id in tag_ids {
            query_params.push(Box::new(*id));
        }
        query_params.push(Box::new(tag_ids.len() as i64));
        let param_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|b| b.as_ref()).collect();

        let mut all = stmt
            .query_map(param_refs.as_slice(), row_to_file_stub)?
            .collect::<Result<Vec<_>, _>>()?;

        let folder = folder_relpath.trim_matches('/');
        if !folder.is_empty() {
            all.retain(|f| matches_folder(&f.path, folder, include_subfolders));
        }

        let total = all.len() as i64;
        let page: Vec<FileRecord> = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        let mut records = page;
        for record in &mut records {
            record.tags = self.tags_for_file(record.id)?;
        }

        Ok((total, records))
    }

    pub fn get_file_by_id(&self, id: i64) -> EngineResult<FileRecord> {
        let mut record = self.conn.query_row(
            "SELECT id, workspace_id, path, name, size, kind, mod_time, created_at, hash
             FROM files WHERE id = ?1",
            params![id],
            row_to_file_stub,
        )?;
        record.tags = self.tags_for_file(record.id)?;
        Ok(record)
    }

    pub fn update_file_name(
        &self,
        id: i64,
        new_basename: &str,
        new_relpath: &str,
    ) -> EngineResult<()> {
        let changed = self.conn.execute(
            "UPDATE files SET name = ?1, path = ?2 WHERE id = ?3",
            params![new_basename, new_relpath, id],
        )?;
        if changed != 1 {
            return Err(EngineError::not_found(format!("file {id}")));
        }
        Ok(())
    }

    fn tags_for_file(&self, file_id: i64) -> EngineResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name, t.color, t.parent_id
             FROM tags t JOIN file_tags ft ON ft.tag_id = t.id
             WHERE ft.file_id = ?1 ORDER BY t.name COLLATE NOCASE ASC",
        )?;
        let rows = stmt
            .query_map(params![file_id], row_to_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ---- Tags --------------------------------------------------------------

    pub fn create_tag(
        &self,
        name: &str,
        color: &str,
        parent_id: Option<i64>,
    ) -> EngineResult<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::invalid_request("tag name must not be empty"));
        }
        let color = if color.trim().is_empty() {
            DEFAULT_TAG_COLOR
        } else {
            color
        };
        self.conn.execute(
            "INSERT INTO tags (name, color, parent_id) VALUES (?1, ?2, ?3)",
            params![name, color, parent_id],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(Tag {
            id,
            name: name.to_string(),
            color: color.to_string(),
            parent_id,
        })
    }

    pub fn get_or_create_tag(&self, name: &str) -> EngineResult<Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::invalid_request("tag name must not be empty"));
        }
        let existing = self
            .conn
            .query_row(
                "SELECT id, name, color, parent_id FROM tags WHERE name = ?1 COLLATE NOCASE",
                params![name],
                row_to_tag,
            )
            .optional()?;
        if let Some(tag) = existing {
            return Ok(tag);
        }
        self.create_tag(name, DEFAULT_TAG_COLOR, None)
    }

    pub fn delete_tag(&self, id: i64) -> EngineResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(EngineError::not_found(format!("tag {id}")));
        }
        Ok(())
    }

    pub fn update_tag_color(&self, id: i64, color: &str) -> EngineResult<()> {
        let changed = self.conn.execute(
            "UPDATE tags SET color = ?1 WHERE id = ?2",
            params![color, id],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found(format!("tag {id}")));
        }
        Ok(())
    }

    pub fn list_tags(&self) -> EngineResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, parent_id FROM tags ORDER BY name COLLATE NOCASE ASC")?;
        let rows = stmt
            .query_map([], row_to_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ---- File <-> Tag edges --------------------------------------------

    pub fn add_tag_to_file(&self, file_id: i64, tag_id: i64) -> EngineResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO file_tags (file_id, tag_id) VALUES (?1, ?2)",
            params![file_id, tag_id],
        )?;
        Ok(())
    }

    pub fn remove_tag_from_file(&self, file_id: i64, tag_id: i64) -> EngineResult<()> {
        self.conn.execute(
            "DELETE FROM file_tags WHERE file_id = ?1 AND tag_id = ?2",
            params![file_id, tag_id],
        )?;
        Ok(())
    }

    pub fn clear_all_tags(&self, file_id: i64) -> EngineResult<()> {
        self.conn.execute(
            "DELETE FROM file_tags WHERE file_id = ?1",
            params![file_id],
        )?;
        Ok(())
    }

    /// Get-or-creates each tag name and inserts the file↔tag edges, all
    /// inside a single transaction. Duplicate edges are silently skipped.
    pub fn batch_add_tags_to_file(&mut self, file_id: i64, tag_names: &[String]) -> EngineResult<()> {
        let txn = self.conn.transaction()?;
        for raw_name in tag_names {
            let name = raw_name.trim();
            if name.is_empty() {
                continue;
            }
            txn.execute(
                "INSERT OR IGNORE INTO tags (name, color, parent_id) VALUES (?1, ?2, NULL)",
                params![name, DEFAULT_TAG_COLOR],
            )?;
            let tag_id: i64 = txn.query_row(
                "SELECT id FROM tags WHERE name = ?1 COLLATE NOCASE",
                params![name],
                |row| row.get(0),
            )?;
            txn.execute(
                "INSERT OR IGNORE INTO file_tags (file_id, tag_id) VALUES (?1, ?2)",
                params![file_id, tag_id],
            )?;
        }
        txn.commit()?;
        Ok(())
    }

    // ---- Operation journal ----------------------------------------------

    pub fn insert_operation(&self, kind: OperationKind, payload_text: &str) -> EngineResult<i64> {
        self.conn.execute(
            "INSERT INTO operations (kind, payload) VALUES (?1, ?2)",
            params![kind.as_db_str(), payload_text],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_operation(&self, id: i64) -> EngineResult<Operation> {
        self.conn
            .query_row(
                "SELECT id, kind, payload, created_at FROM operations WHERE id = ?1",
                params![id],
                |row| {
                    let kind_str: String = row.get(1)?;
                    Ok((
                        row.get::<_, i64>(0)?,
                        kind_str,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .map_err(EngineError::from)
            .and_then(|(id, kind_str, payload, created_at)| {
                let kind = OperationKind::from_db_str(&kind_str)
                    .ok_or_else(|| EngineError::invalid_request(format!("unknown operation kind: {kind_str}")))?;
                Ok(Operation {
                    id,
                    kind,
                    payload,
                    created_at,
                })
            })
    }

    pub fn delete_operation(&self, id: i64) -> EngineResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM operations WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(EngineError::not_found(format!("operation {id}")));
        }
        Ok(())
    }

    // ---- Settings ---------------------------------------------------------

    pub fn get_setting(&self, key: &str) -> EngineResult<String> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.unwrap_or_default())
    }

    pub fn set_setting(&self, key: &str, value: &str) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    // ---- Recent items -------------------------------------------------

    pub fn add_recent_item(&self, kind: RecentItemKind, path: &str, name: &str) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO recent_items (kind, path, name, opened_at) VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(path) DO UPDATE SET name = excluded.name, opened_at = excluded.opened_at, kind = excluded.kind",
            params![kind.as_db_str(), path, name],
        )?;
        Ok(())
    }

    pub fn get_recent_items(&self, limit: i64) -> EngineResult<Vec<RecentItem>> {
        let limit = if limit <= 0 { DEFAULT_LIST_LIMIT } else { limit };
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, path, name, opened_at FROM recent_items
             ORDER BY opened_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| {
                let kind_str: String = row.get(1)?;
                Ok((
                    row.get::<_, i64>(0)?,
                    kind_str,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, kind_str, path, name, opened_at)| {
                let kind = RecentItemKind::from_db_str(&kind_str).ok_or_else(|| {
                    EngineError::invalid_request(format!("unknown recent item kind: {kind_str}"))
                })?;
                Ok(RecentItem {
                    id,
                    kind,
                    path,
                    name,
                    opened_at,
                })
            })
            .collect()
    }

    pub fn remove_recent_item(&self, path: &str) -> EngineResult<()> {
        self.conn
            .execute("DELETE FROM recent_items WHERE path = ?1", params![path])?;
        Ok(())
    }
}

fn matches_folder(relpath: &str, folder: &str, include_subfolders: bool) -> bool {
    let prefix = format!("{folder}/");
    match relpath.strip_prefix(&prefix) {
        Some(rest) => include_subfolders || !rest.contains('/'),
        None => false,
    }
}

fn row_to_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        parent_id: row.get(3)?,
    })
}

fn row_to_file_stub(row: &rusqlite::Row) -> rusqlite::Result<FileRecord> {
    let kind_str: String = row.get(5)?;
    let kind = FileKind::from_db_str(&kind_str).unwrap_or(FileKind::File);
    Ok(FileRecord {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        path: row.get(2)?,
        name: row.get(3)?,
        size: row.get(4)?,
        kind,
        mod_time: row.get(6)?,
        created_at: row.get(7)?,
        hash: row.get(8)?,
        tags: Vec::new(),
    })
}

/// A transactional window over `files` for one workspace: clears the table on
/// open, accepts streamed batches, and either commits or (on drop) rolls back.
pub struct ImportSession<'a> {
    txn: Transaction<'a>,
    workspace_id: i64,
}

impl<'a> ImportSession<'a> {
    pub fn insert(&self, batch: &[FileMetadata]) -> EngineResult<()> {
        let mut stmt = self.txn.prepare_cached(
            "INSERT INTO files (workspace_id, path, name, size, kind, mod_time, created_at, hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL)",
        )?;
        for item in batch {
            stmt.execute(params![
                self.workspace_id,
                item.relpath,
                item.name,
                item.size,
                item.kind.as_db_str(),
                item.mod_time,
                item.created_at,
            ])?;
        }
        Ok(())
    }

    pub fn commit(self) -> EngineResult<()> {
        self.txn.commit()?;
        Ok(())
    }
}
