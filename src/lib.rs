//! Semantic search over Korean weekly farm advisory bulletins.
//!
//! `nongsa` ingests a multi-year advisory document (주간농사정보), splits it
//! into dated sections, extracts category tags with Hangul-aware keyword
//! matching, embeds each section with a local ONNX model, and stores the
//! records in SQLite for cosine-similarity retrieval.
//!
//! # Architecture
//!
//! - **Storage**: SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec)
//!   for the vector index, opened read-only on the query path
//! - **Embeddings**: Local ONNX Runtime with a multilingual sentence encoder;
//!   the output dimension is discovered from the model at startup
//! - **Ingestion**: single-threaded, batch-oriented, with per-batch buffers
//!   released before the next batch starts
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database open paths, schema, and store metadata
//! - [`embedding`] — Text-to-vector embedding pipeline via ONNX Runtime
//! - [`ingest`] — Segmentation, normalization, tagging, and the batched embed loop
//! - [`advisory`] — Record types, the buffered write path, and query-time ranking

pub mod advisory;
pub mod config;
pub mod db;
pub mod embedding;
pub mod ingest;
