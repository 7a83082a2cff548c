//! Advisory record types and embedding byte helpers.

pub mod search;
pub mod writer;

use serde::{Deserialize, Serialize};

/// A persisted advisory record, matching the `advisories` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisory {
    /// Storage-assigned auto-increment id, never reused.
    pub id: i64,
    /// Year parsed from the section header.
    pub year: i32,
    /// Month parsed from the section header, always in `1..=12`.
    pub month: u32,
    /// The raw header line, kept unnormalized for display.
    pub title: String,
    /// Category tag sets extracted at ingest time.
    pub tags: TagSets,
    /// The raw section body, kept unnormalized for display.
    pub content: String,
    /// RFC 3339 ingestion timestamp.
    pub created_at: String,
}

/// A record ready to be written — everything except the storage-assigned id
/// and timestamp.
#[derive(Debug, Clone)]
pub struct NewAdvisory {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub tags: TagSets,
    pub content: String,
}

/// Matched keywords per tag category. Each set is deduplicated and
/// lexicographically sorted; empty sets are normal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSets {
    pub crop: Vec<String>,
    pub task: Vec<String>,
    pub env: Vec<String>,
    pub pest: Vec<String>,
    pub admin: Vec<String>,
}

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            embedding.len() * std::mem::size_of::<f32>(),
        )
    }
}

/// Decode an embedding column back into f32s.
pub fn embedding_from_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_bytes_round_trip() {
        let v = vec![0.25f32, -1.5, 0.0, 3.75];
        let bytes = embedding_to_bytes(&v);
        assert_eq!(bytes.len(), 16);
        assert_eq!(embedding_from_bytes(bytes), v);
    }
}
