//! Query-time ranking over the advisory vector index.
//!
//! Embeds the query with the same provider contract used at ingest time and
//! returns the top-k records by cosine similarity. Read-only: nothing on this
//! path mutates the store.

use std::collections::HashMap;

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::advisory::{embedding_to_bytes, Advisory, TagSets};
use crate::db::schema;
use crate::embedding::EmbeddingProvider;
use crate::ingest::normalize::Normalizer;

/// Queries shorter than this are rejected before any embedding call.
pub const MIN_QUERY_CHARS: usize = 2;

/// Extra neighbors fetched beyond `k` so equal-score ties can be reordered by
/// id. Tie runs longer than this are not reordered.
const KNN_OVERFETCH: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("query must be at least {MIN_QUERY_CHARS} characters")]
    QueryTooShort,
    #[error("k must be at least 1")]
    InvalidK,
    /// Fatal: the active model cannot be compared against this store.
    #[error("store holds {stored}-dim embeddings, the active model produces {actual}")]
    DimensionMismatch { stored: usize, actual: usize },
    #[error("store has no embedding dimension recorded. Run `nongsa ingest` first.")]
    Uninitialized,
    #[error("failed to embed query: {0}")]
    Embedding(#[source] anyhow::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// One ranked result.
#[derive(Debug, Clone, Serialize)]
pub struct RankedAdvisory {
    pub advisory: Advisory,
    /// Cosine similarity against the query, in `[-1.0, 1.0]`.
    pub score: f64,
}

/// Rank the stored advisories against a free-text query.
///
/// Returns at most `k` results, descending by score; equal scores are ordered
/// by ascending id so repeated calls return identical sequences.
pub fn rank(
    conn: &Connection,
    provider: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
) -> Result<Vec<RankedAdvisory>, SearchError> {
    if k == 0 {
        return Err(SearchError::InvalidK);
    }
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(SearchError::QueryTooShort);
    }

    let stored = schema::stored_dimension(conn)?.ok_or(SearchError::Uninitialized)?;
    let active = provider.dimensions();
    if active != stored {
        return Err(SearchError::DimensionMismatch {
            stored,
            actual: active,
        });
    }

    let cleaned = Normalizer::new().normalize(query);
    let embedding = provider.embed(&cleaned).map_err(SearchError::Embedding)?;
    if embedding.len() != stored {
        return Err(SearchError::DimensionMismatch {
            stored,
            actual: embedding.len(),
        });
    }

    let hits = knn(conn, &embedding, k + KNN_OVERFETCH)?;

    // Cosine distance from vec0 → similarity, then deterministic ordering.
    let mut scored: Vec<(i64, f64)> = hits
        .into_iter()
        .map(|(id, distance)| (id, 1.0 - distance))
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    scored.truncate(k);

    let ids: Vec<i64> = scored.iter().map(|(id, _)| *id).collect();
    let mut advisories = fetch_advisories(conn, &ids)?;

    Ok(scored
        .into_iter()
        .filter_map(|(id, score)| {
            advisories
                .remove(&id)
                .map(|advisory| RankedAdvisory { advisory, score })
        })
        .collect())
}

/// KNN over the vec0 table, nearest first.
fn knn(conn: &Connection, embedding: &[f32], limit: usize) -> Result<Vec<(i64, f64)>, SearchError> {
    let mut stmt = conn.prepare(
        "SELECT id, distance FROM advisories_vec \
         WHERE embedding MATCH ?1 ORDER BY distance LIMIT ?2",
    )?;
    let results = stmt
        .query_map(params![embedding_to_bytes(embedding), limit as i64], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(results)
}

/// Batch-fetch advisory records by id.
fn fetch_advisories(
    conn: &Connection,
    ids: &[i64],
) -> Result<HashMap<i64, Advisory>, SearchError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT id, year, month, title, tags_crop, tags_task, tags_env, tags_pest, \
         tags_admin, content, created_at \
         FROM advisories WHERE id IN ({})",
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_vec: Vec<&dyn rusqlite::types::ToSql> = ids
        .iter()
        .map(|id| id as &dyn rusqlite::types::ToSql)
        .collect();

    let rows = stmt
        .query_map(params_vec.as_slice(), |row| {
            Ok(Advisory {
                id: row.get(0)?,
                year: row.get(1)?,
                month: row.get(2)?,
                title: row.get(3)?,
                tags: TagSets {
                    crop: tag_column(row.get::<_, String>(4)?),
                    task: tag_column(row.get::<_, String>(5)?),
                    env: tag_column(row.get::<_, String>(6)?),
                    pest: tag_column(row.get::<_, String>(7)?),
                    admin: tag_column(row.get::<_, String>(8)?),
                },
                content: row.get(9)?,
                created_at: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut map = HashMap::new();
    for advisory in rows {
        map.insert(advisory.id, advisory);
    }
    Ok(map)
}

fn tag_column(json: String) -> Vec<String> {
    serde_json::from_str(&json).unwrap_or_default()
}
