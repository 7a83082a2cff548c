//! Ingestion pipeline: segment → normalize/tag → batched embed → persist.
//!
//! The pipeline is single-threaded and batch-oriented on purpose: one batch
//! of sections is fully embedded and handed to the writer before the next is
//! assembled, and every per-batch buffer goes out of scope at the end of its
//! loop iteration. Peak memory stays bounded by the batch size regardless of
//! corpus size.

pub mod normalize;
pub mod segment;
pub mod tags;

use crate::advisory::writer::AdvisoryWriter;
use crate::advisory::NewAdvisory;
use crate::db::StoreError;
use crate::embedding::EmbeddingProvider;
use self::normalize::Normalizer;
use self::segment::{RawSection, Segmenter};
use self::tags::TagMatcher;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The backend produced a vector that disagrees with the dimension it
    /// reported at pipeline start. Fatal: persisting it would poison the store.
    #[error("backend produced a {actual}-dim vector, pipeline is {expected}-dim")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Knobs for one ingestion run, taken from [`crate::config::IngestConfig`].
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub batch_size: usize,
    pub max_text_chars: usize,
    pub tag_window_chars: usize,
}

/// Counters reported at the end of a run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Dated sections found in the document.
    pub sections: usize,
    /// Chunks dropped during segmentation (preamble, 목차, malformed).
    pub skipped: usize,
    /// Batches dropped because the backend failed to encode them.
    pub dropped_batches: usize,
    /// Records handed to the writer.
    pub records_written: usize,
}

/// Run the full ingestion pipeline over one document.
///
/// Segmentation skips and embed-batch failures are recovered locally — the
/// run continues and the report says what was lost. Storage errors and
/// dimension mismatches propagate.
pub fn run_ingest(
    document: &str,
    provider: &dyn EmbeddingProvider,
    matcher: &TagMatcher,
    writer: &mut AdvisoryWriter<'_>,
    options: &IngestOptions,
) -> Result<IngestReport, IngestError> {
    let normalizer = Normalizer::new();
    let dimension = provider.dimensions();
    let batch_size = options.batch_size.max(1);

    let segmented = Segmenter::new().segment(document);
    let mut report = IngestReport {
        sections: segmented.sections.len(),
        skipped: segmented.skipped,
        ..IngestReport::default()
    };

    for batch in segmented.sections.chunks(batch_size) {
        // Texts and drafts live only for this iteration.
        let mut texts = Vec::with_capacity(batch.len());
        let mut drafts = Vec::with_capacity(batch.len());
        for section in batch {
            texts.push(normalizer.embedding_input(
                &section.header,
                &section.body,
                options.max_text_chars,
            ));
            drafts.push(NewAdvisory {
                year: section.year,
                month: section.month,
                title: section.header.clone(),
                tags: matcher.extract(&tag_window(section, options.tag_window_chars)),
                content: section.body.clone(),
            });
        }

        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = match provider.embed_batch(&text_refs) {
            Ok(embeddings) => embeddings,
            Err(err) => {
                tracing::warn!(
                    sections = batch.len(),
                    error = %err,
                    "embed batch failed, dropping its sections"
                );
                report.dropped_batches += 1;
                continue;
            }
        };
        if embeddings.len() != drafts.len() {
            tracing::warn!(
                expected = drafts.len(),
                got = embeddings.len(),
                "backend returned a short batch, dropping it"
            );
            report.dropped_batches += 1;
            continue;
        }

        for (draft, embedding) in drafts.into_iter().zip(embeddings) {
            if embedding.len() != dimension {
                return Err(IngestError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            writer.write(draft, &embedding)?;
            report.records_written += 1;
        }
    }

    tracing::info!(
        sections = report.sections,
        skipped = report.skipped,
        dropped_batches = report.dropped_batches,
        records = report.records_written,
        "ingestion finished"
    );
    Ok(report)
}

/// Tags come from the header plus the start of the body, not the whole record.
fn tag_window(section: &RawSection, window_chars: usize) -> String {
    let body_prefix = match section.body.char_indices().nth(window_chars) {
        Some((idx, _)) => &section.body[..idx],
        None => section.body.as_str(),
    };
    format!("{} {}", section.header, body_prefix)
}
