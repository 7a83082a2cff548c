pub mod schema;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use sqlite_vec::sqlite3_vec_init;
use std::path::Path;
use std::sync::Once;

static SQLITE_VEC_INIT: Once = Once::new();

/// Register the sqlite-vec extension globally. Safe to call multiple times.
pub fn load_sqlite_vec() {
    SQLITE_VEC_INIT.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// Errors from the advisory store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store and the active embedding disagree on vector width. Silent
    /// truncation or padding would corrupt similarity scores, so this is
    /// always refused.
    #[error("embedding dimension mismatch: store expects {stored}, got {actual}")]
    DimensionMismatch { stored: usize, actual: usize },
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Open (or create) the advisory database at the given path for writing,
/// with the vector extension loaded. Schema creation is the writer's job
/// because the vector table is sized to the active embedding dimension.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    load_sqlite_vec();

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // WAL mode for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")?;

    tracing::info!(path = %path.display(), "database opened");
    Ok(conn)
}

/// Open an existing advisory database read-only. The query path must never
/// mutate the store.
pub fn open_readonly(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    anyhow::ensure!(
        path.exists(),
        "no advisory store at {}. Run `nongsa ingest` first.",
        path.display()
    );

    load_sqlite_vec();

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    tracing::debug!(path = %path.display(), "database opened read-only");
    Ok(conn)
}

/// Open an in-memory database for testing.
#[cfg(test)]
pub fn open_memory_database(dimension: usize) -> Result<Connection> {
    load_sqlite_vec();
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    schema::init_schema(&conn, dimension)?;
    Ok(conn)
}
