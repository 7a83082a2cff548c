//! CLI `ingest` command — build the advisory store from a source document.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

use crate::advisory::writer::AdvisoryWriter;
use crate::config::NongsaConfig;
use crate::ingest::tags::TagMatcher;
use crate::ingest::{run_ingest, IngestOptions};

/// Ingest a document: segment, tag, embed, persist, and build the index.
pub fn ingest(config: &NongsaConfig, file: &Path) -> Result<()> {
    let document = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read document: {}", file.display()))?;

    // Provider and connection are created once here and reused for the whole
    // run. Initialization failures stop before anything is written.
    let provider = crate::embedding::create_provider(&config.embedding)
        .context("failed to create embedding provider")?;
    let dimension = provider.dimensions();

    let db_path = config.resolved_db_path();
    let mut conn = crate::db::open_database(&db_path).context("failed to open database")?;

    let matcher = TagMatcher::new(&config.tags);
    let options = IngestOptions {
        batch_size: config.ingest.batch_size,
        max_text_chars: config.ingest.max_text_chars,
        tag_window_chars: config.ingest.tag_window_chars,
    };

    println!(
        "Ingesting {} with model '{}' ({dimension} dimensions)...",
        file.display(),
        config.embedding.model
    );
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("embedding sections...");

    let mut writer = AdvisoryWriter::new(&mut conn, dimension, config.ingest.insert_batch)?;
    let report = run_ingest(&document, provider.as_ref(), &matcher, &mut writer, &options)?;
    let indexed = writer.finish()?;

    pb.finish_and_clear();

    crate::db::schema::set_embedding_model(&conn, &config.embedding.model)?;

    println!("Ingestion complete:");
    println!("  Sections found:   {}", report.sections);
    println!("  Sections skipped: {} (preamble, 목차, malformed)", report.skipped);
    if report.dropped_batches > 0 {
        println!("  Batches dropped:  {} (embedding failures)", report.dropped_batches);
    }
    println!("  Records written:  {}", report.records_written);
    println!("  Records indexed:  {indexed}");
    println!("  Store:            {}", db_path.display());

    Ok(())
}
