//! Tauri-managed application state: a single `Engine` behind a `Mutex`,
//! the same `State<'_, Arc<Mutex<_>>>` shape the host project uses for its
//! own database connection, but holding the whole engine rather than a bare
//! connection, since §4.1 calls for exactly one open store connection.

use std::sync::{Arc, Mutex};

use crate::engine::Engine;

pub type EngineState = Arc<Mutex<Engine>>;
