//! Process-wide shared state, injected into handlers as `web::Data`.
//!
//! The database connection is opened once in `main.rs` and shared across
//! workers behind a mutex; SQLite serializes writes anyway, so a single
//! guarded connection is enough here. Handlers receive the state as a
//! dependency instead of reaching for globals.

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Mutex;

pub struct AppState {
    /// The record store connection. Dropped (and flushed) at process exit.
    pub db: Mutex<Connection>,
    /// Directory uploaded files are written to and served back from.
    pub uploads_dir: PathBuf,
}

impl AppState {
    pub fn new(db: Connection, uploads_dir: PathBuf) -> Self {
        Self {
            db: Mutex::new(db),
            uploads_dir,
        }
    }
}
