//! CLI `stats` command — summarize the advisory store.

use anyhow::Result;

use crate::config::NongsaConfig;
use crate::db::schema;

pub fn stats(config: &NongsaConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_readonly(&db_path)?;

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM advisories", [], |r| r.get(0))?;
    println!("Store: {}", db_path.display());
    if count == 0 {
        println!("  No records. Run `nongsa ingest` first.");
        return Ok(());
    }

    let (min_year, max_year): (i32, i32) = conn.query_row(
        "SELECT MIN(year), MAX(year) FROM advisories",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;

    println!("  Records:   {count}");
    println!("  Years:     {min_year}-{max_year}");
    if let Some(dimension) = schema::stored_dimension(&conn)? {
        println!("  Dimension: {dimension}");
    }
    if let Some(model) = schema::get_embedding_model(&conn)? {
        println!("  Model:     {model}");
    }

    println!("  Tagged records per category:");
    for (name, column) in [
        ("crop", "tags_crop"),
        ("task", "tags_task"),
        ("env", "tags_env"),
        ("pest", "tags_pest"),
        ("admin", "tags_admin"),
    ] {
        let tagged: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM advisories WHERE {column} != '[]'"),
            [],
            |r| r.get(0),
        )?;
        println!("    {name:<6} {tagged}");
    }

    Ok(())
}
