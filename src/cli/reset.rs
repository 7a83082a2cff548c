//! CLI `reset` command — delete the whole store.
//!
//! Records are never deleted individually; rebuilding from the source
//! document is the supported way to change the store's contents.

use anyhow::Result;

use crate::config::NongsaConfig;

pub fn reset(config: &NongsaConfig, yes: bool) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("No store at {}, nothing to do.", db_path.display());
        return Ok(());
    }

    if !yes {
        anyhow::bail!(
            "refusing to delete {} without --yes",
            db_path.display()
        );
    }

    std::fs::remove_file(&db_path)?;
    // WAL sidecar files, if present
    for suffix in ["-wal", "-shm"] {
        let mut sidecar = db_path.as_os_str().to_owned();
        sidecar.push(suffix);
        let _ = std::fs::remove_file(sidecar);
    }

    println!("Deleted {}.", db_path.display());
    Ok(())
}
