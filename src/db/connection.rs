use rusqlite::{Connection, Result as SqliteResult};
use std::path::PathBuf;

use crate::config::{APP_DIR_NAME, DB_BUSY_TIMEOUT_MS, DB_FILENAME};

use super::schema;

/// Get the default database path, rooted under the app's data directory.
pub fn get_db_path(app_data_dir: PathBuf) -> PathBuf {
    app_data_dir.join(APP_DIR_NAME).join(DB_FILENAME)
}

/// Open (creating if necessary) the metadata store at `db_path`, apply the
/// pragma layer (busy timeout, WAL, foreign keys), and ensure the schema is
/// present. Exactly one connection should ever be open against a given
/// database file at a time.
pub fn init_db(db_path: PathBuf) -> SqliteResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let conn = Connection::open(db_path)?;

    conn.busy_timeout(std::time::Duration::from_millis(DB_BUSY_TIMEOUT_MS as u64))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    conn.execute_batch("PRAGMA journal_mode = WAL")?;

    schema::init_schema(&conn)?;

    Ok(conn)
}

/// Open an in-memory store, primarily for tests. Applies the same pragma
/// layer and schema as a file-backed connection (WAL is a no-op on `:memory:`
/// but harmless to request).
pub fn init_memory_db() -> SqliteResult<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.busy_timeout(std::time::Duration::from_millis(DB_BUSY_TIMEOUT_MS as u64))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    schema::init_schema(&conn)?;
    Ok(conn)
}
