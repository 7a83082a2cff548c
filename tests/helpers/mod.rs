#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use nongsa::db;
use nongsa::embedding::EmbeddingProvider;
use rusqlite::Connection;

/// Wide enough that test vocabularies never collide on a dimension.
pub const TEST_DIM: usize = 256;

/// Sample bulletin: a preamble, a table of contents, and two dated sections.
pub const SAMPLE_DOC: &str = "\
주간농사정보 모음입니다.

# [목차]
- 2024년 5월
- 2024년 6월

# [2024-05-3주차] 벼 이앙 시기
못자리 관리와 이앙 준비 요령.
물 관리와 비료 주기에 유의.

# [2024-06-1주차] 고추 탄저병 방제
고추 탄저병 방제 적기.
집중호우 이후 과습에 유의.
";

/// Fresh in-memory store with schema sized to `dimension`.
pub fn test_conn(dimension: usize) -> Connection {
    db::load_sqlite_vec();
    let conn = Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn, dimension).unwrap();
    conn
}

/// Unit vector with a spike at `spike`.
pub fn unit_vec(dimension: usize, spike: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; dimension];
    v[spike % dimension] = 1.0;
    v
}

/// Deterministic bag-of-words embedding provider.
///
/// Each distinct whitespace token gets the next free dimension, so cosine
/// similarity between two embeddings reduces to normalized token overlap.
/// Every encode call is counted so tests can assert that a call never
/// happened.
pub struct BagEmbedder {
    dimension: usize,
    vocab: Mutex<HashMap<String, usize>>,
    calls: AtomicUsize,
}

impl BagEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vocab: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        let mut vocab = self.vocab.lock().unwrap();
        for token in text.split_whitespace() {
            let next = vocab.len();
            let slot = *vocab.entry(token.to_string()).or_insert(next) % self.dimension;
            v[slot] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl EmbeddingProvider for BagEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vectorize(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimension
    }
}
