//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait and a local ONNX Runtime
//! implementation. The provider is created via [`create_provider`] from
//! configuration; the output dimension belongs to the model and is reported
//! by [`EmbeddingProvider::dimensions`], never hardcoded.

pub mod local;

use anyhow::Result;

/// Trait for embedding text into vectors.
///
/// Implementations produce L2-normalized vectors whose width is fixed for the
/// provider's lifetime and reported by [`dimensions`](Self::dimensions). All
/// methods are synchronous — callers in async contexts should use
/// `tokio::task::spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text strings, same order and length as the input.
    /// Implementations may override for batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// The number of dimensions this provider produces.
    fn dimensions(&self) -> usize;
}

/// Create an embedding provider from config.
///
/// Currently only `"local"` is supported (ONNX Runtime). Returns an error if
/// model files are not found — run `nongsa model download` first.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => {
            let provider = local::LocalEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local"),
    }
}
