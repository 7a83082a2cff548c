//! SQL DDL for the advisory store.
//!
//! Defines the `advisories` table, the `advisories_vec` (vec0) KNN table, and
//! the `schema_meta` key/value table. The vec0 table is sized at init time to
//! the active embedding dimension; re-initializing an existing store with a
//! different dimension is an error, never a silent resize.

use rusqlite::Connection;

use super::StoreError;

/// DDL for the plain tables. All statements use `IF NOT EXISTS` so
/// initialization is idempotent.
const SCHEMA_SQL: &str = r#"
-- One row per dated advisory section
CREATE TABLE IF NOT EXISTS advisories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL CHECK(month BETWEEN 1 AND 12),
    title TEXT NOT NULL,
    tags_crop TEXT NOT NULL DEFAULT '[]',
    tags_task TEXT NOT NULL DEFAULT '[]',
    tags_env TEXT NOT NULL DEFAULT '[]',
    tags_pest TEXT NOT NULL DEFAULT '[]',
    tags_admin TEXT NOT NULL DEFAULT '[]',
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_advisories_year_month ON advisories(year, month);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables for a store holding `dimension`-wide vectors.
///
/// Idempotent when called with the dimension the store was created with.
/// Returns [`StoreError::DimensionMismatch`] if the store already records a
/// different dimension.
pub fn init_schema(conn: &Connection, dimension: usize) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA_SQL)?;

    match stored_dimension(conn)? {
        Some(stored) if stored != dimension => {
            return Err(StoreError::DimensionMismatch {
                stored,
                actual: dimension,
            });
        }
        Some(_) => {}
        None => {
            conn.execute(
                "INSERT INTO schema_meta (key, value) VALUES ('embedding_dim', ?1)",
                [dimension.to_string()],
            )?;
        }
    }

    // vec0 virtual table must be created separately (sqlite-vec syntax).
    // FLOAT[n] is fixed per store, which is why the dimension check above
    // runs first.
    let vec_sql = format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS advisories_vec USING vec0(\
         id INTEGER PRIMARY KEY, embedding FLOAT[{dimension}] distance_metric=cosine);"
    );
    conn.execute_batch(&vec_sql)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

/// The vector dimension this store was created with, if initialized.
pub fn stored_dimension(conn: &Connection) -> rusqlite::Result<Option<usize>> {
    match conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'embedding_dim'",
        [],
        |row| row.get::<_, String>(0),
    ) {
        Ok(val) => Ok(val.parse::<usize>().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Get the stored embedding model identifier, if any.
pub fn get_embedding_model(conn: &Connection) -> rusqlite::Result<Option<String>> {
    match conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'embedding_model'",
        [],
        |row| row.get::<_, String>(0),
    ) {
        Ok(val) => Ok(Some(val)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Set the stored embedding model identifier.
pub fn set_embedding_model(conn: &Connection, model: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_meta (key, value) VALUES ('embedding_model', ?1)",
        [model],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        crate::db::load_sqlite_vec();
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn schema_creates_all_tables() {
        let conn = test_conn();
        init_schema(&conn, 384).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"advisories".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));

        // Verify the vector extension is live
        let version: String = conn
            .query_row("SELECT vec_version()", [], |r| r.get(0))
            .unwrap();
        assert!(!version.is_empty());

        assert_eq!(stored_dimension(&conn).unwrap(), Some(384));
    }

    #[test]
    fn schema_is_idempotent_with_same_dimension() {
        let conn = test_conn();
        init_schema(&conn, 384).unwrap();
        init_schema(&conn, 384).unwrap(); // second call should not error
    }

    #[test]
    fn reinit_with_different_dimension_fails() {
        let conn = test_conn();
        init_schema(&conn, 768).unwrap();

        let err = init_schema(&conn, 1024).unwrap_err();
        match err {
            StoreError::DimensionMismatch { stored, actual } => {
                assert_eq!(stored, 768);
                assert_eq!(actual, 1024);
            }
            other => panic!("expected DimensionMismatch, got {other}"),
        }
    }

    #[test]
    fn stored_dimension_empty_before_init() {
        let conn = test_conn();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        assert_eq!(stored_dimension(&conn).unwrap(), None);
    }

    #[test]
    fn set_and_get_embedding_model() {
        let conn = test_conn();
        init_schema(&conn, 384).unwrap();
        assert!(get_embedding_model(&conn).unwrap().is_none());

        set_embedding_model(&conn, "paraphrase-multilingual-MiniLM-L12-v2").unwrap();
        assert_eq!(
            get_embedding_model(&conn).unwrap().as_deref(),
            Some("paraphrase-multilingual-MiniLM-L12-v2")
        );
    }
}
