use anyhow::Result;

use crate::advisory::search::rank;
use crate::config::NongsaConfig;

/// Run a search from the terminal and print ranked results.
pub fn search(config: &NongsaConfig, query: &str, top: Option<usize>) -> Result<()> {
    let conn = crate::db::open_readonly(config.resolved_db_path())?;
    let provider = crate::embedding::create_provider(&config.embedding)?;
    let k = top.unwrap_or(config.search.default_top_k);

    let results = rank(&conn, provider.as_ref(), query, k)?;

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        let advisory = &result.advisory;
        println!(
            "{}. [{}-{:02}] {} (similarity: {:.4})",
            i + 1,
            advisory.year,
            advisory.month,
            advisory.title.trim_start_matches(['#', ' ']),
            result.score,
        );
        if !advisory.tags.crop.is_empty() {
            println!("   crops: {}", advisory.tags.crop.join(", "));
        }
        if !advisory.tags.pest.is_empty() {
            println!("   pests: {}", advisory.tags.pest.join(", "));
        }
        let preview = preview(&advisory.content, 160);
        if !preview.is_empty() {
            println!("   {preview}");
        }
        println!();
    }

    Ok(())
}

/// First `max_chars` characters of the content, single-line.
fn preview(content: &str, max_chars: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}
