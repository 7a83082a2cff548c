//! Buffered write path for advisory records.
//!
//! [`AdvisoryWriter`] owns schema creation (sized to the active embedding
//! dimension), buffers records up to a flush threshold, and builds the KNN
//! index once all writes are done. Records are append-only: nothing here
//! updates or deletes individual rows.

use rusqlite::{params, Connection};

use crate::advisory::{embedding_to_bytes, NewAdvisory};
use crate::db::{schema, StoreError};

pub struct AdvisoryWriter<'a> {
    conn: &'a mut Connection,
    dimension: usize,
    insert_batch: usize,
    buffer: Vec<(NewAdvisory, Vec<f32>)>,
}

impl<'a> AdvisoryWriter<'a> {
    /// Initialize the schema for `dimension`-wide vectors and return a writer.
    ///
    /// Fails with [`StoreError::DimensionMismatch`] if the store already
    /// exists with a different dimension.
    pub fn new(
        conn: &'a mut Connection,
        dimension: usize,
        insert_batch: usize,
    ) -> Result<Self, StoreError> {
        schema::init_schema(conn, dimension)?;
        Ok(Self {
            conn,
            dimension,
            insert_batch: insert_batch.max(1),
            buffer: Vec::new(),
        })
    }

    /// Buffer one record; flushes automatically once the threshold is reached.
    /// The embedding must match the store dimension exactly — never truncated
    /// or padded.
    pub fn write(&mut self, record: NewAdvisory, embedding: &[f32]) -> Result<(), StoreError> {
        if embedding.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                stored: self.dimension,
                actual: embedding.len(),
            });
        }
        self.buffer.push((record, embedding.to_vec()));
        if self.buffer.len() >= self.insert_batch {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush all buffered records inside one transaction.
    ///
    /// A failed flush rolls back and does not keep the rows for a retry;
    /// records are re-creatable from source, already-flushed data is
    /// untouched.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let rows = std::mem::take(&mut self.buffer);

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO advisories (year, month, title, tags_crop, tags_task, tags_env, \
                 tags_pest, tags_admin, content, embedding, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            let now = chrono::Utc::now().to_rfc3339();
            for (record, embedding) in &rows {
                stmt.execute(params![
                    record.year,
                    record.month,
                    record.title,
                    serde_json::to_string(&record.tags.crop)?,
                    serde_json::to_string(&record.tags.task)?,
                    serde_json::to_string(&record.tags.env)?,
                    serde_json::to_string(&record.tags.pest)?,
                    serde_json::to_string(&record.tags.admin)?,
                    record.content,
                    embedding_to_bytes(embedding),
                    now,
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!(rows = rows.len(), "flushed advisory batch");
        Ok(())
    }

    /// Flush the remainder and build the vector index. Consumes the writer.
    /// Returns the number of indexed records.
    pub fn finish(mut self) -> Result<usize, StoreError> {
        self.flush()?;
        build_index(self.conn)
    }
}

/// Rebuild `advisories_vec` from the `advisories` table. A one-time,
/// whole-table operation run after ingestion, not incrementally.
pub fn build_index(conn: &mut Connection) -> Result<usize, StoreError> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM advisories_vec", [])?;
    let mut indexed = 0usize;
    {
        let mut read = tx.prepare("SELECT id, embedding FROM advisories ORDER BY id")?;
        let mut insert =
            tx.prepare("INSERT INTO advisories_vec (id, embedding) VALUES (?1, ?2)")?;
        let rows = read.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;
        for row in rows {
            let (id, embedding) = row?;
            insert.execute(params![id, embedding])?;
            indexed += 1;
        }
    }
    tx.commit()?;

    tracing::info!(records = indexed, "vector index built");
    Ok(indexed)
}
