//! Global configuration constants for the Tag Explorer engine.
//!
//! Centralized location for values that would otherwise be scattered
//! literals across the store, scanner, renamer, and organize modules.

/// Subdirectory of the app data dir that holds the metadata store.
pub const APP_DIR_NAME: &str = "tagexplorer";

/// Database filename within the app data directory.
pub const DB_FILENAME: &str = "tagexplorer.db";

/// Extension used by workspace configuration documents.
pub const WORKSPACE_CONFIG_EXTENSION: &str = "teworkplace";

/// Settings key under which the tag grammar configuration is stored.
pub const SETTINGS_KEY_APP_SETTINGS: &str = "app_settings";

/// Default tag color, applied whenever a tag is created without one.
pub const DEFAULT_TAG_COLOR: &str = "#94a3b8";

/// SQLite busy timeout, in milliseconds.
pub const DB_BUSY_TIMEOUT_MS: u32 = 5_000;

/// Batch size used by the scanner when flushing discovered entries.
pub const SCAN_BATCH_SIZE: usize = 500;

/// Batch size used by the scanner's implicit filename-tagging pass.
pub const IMPLICIT_TAGGING_BATCH_SIZE: usize = 1000;

/// Batch size used by the grammar-change workspace-wide re-rename pass.
pub const GRAMMAR_CHANGE_BATCH_SIZE: usize = 100;

/// Batch size used when enumerating candidate files for an organize plan.
pub const ORGANIZE_ENUMERATION_BATCH_SIZE: usize = 500;

/// Default page size for `list_files` and friends.
pub const DEFAULT_LIST_LIMIT: i64 = 200;

/// Minimum accepted page size.
pub const MIN_LIST_LIMIT: i64 = 1;

/// Maximum accepted page size.
pub const MAX_LIST_LIMIT: i64 = 2000;

/// Default bound on the recent-items list.
pub const DEFAULT_RECENT_ITEMS_LIMIT: i64 = 20;

/// Directory basenames (case-insensitive) whose entire subtree the scanner skips.
pub const EXCLUDED_DIR_NAMES: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "$recycle.bin",
    "system volume information",
    ".trash",
    ".ds_store",
    "__pycache__",
    ".venv",
    "venv",
    ".idea",
    ".vscode",
    "vendor",
    "dist",
    "build",
    ".cache",
    ".npm",
    ".yarn",
];

/// Fallback folder-segment name used by the organize planner when a sanitized
/// tag name would otherwise be empty.
pub const UNNAMED_SEGMENT: &str = "未命名";

/// Maximum number of strip sweeps performed when removing tag blocks from a
/// basename (§4.3 of the spec — whichever comes first: no-change or this cap).
pub const MAX_STRIP_ITERATIONS: usize = 20;
