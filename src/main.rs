mod advisory;
mod cli;
mod config;
mod db;
mod embedding;
mod ingest;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nongsa",
    version,
    about = "Semantic search over Korean weekly farm advisory bulletins"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest an advisory document into the store
    Ingest {
        /// Path to the source document (markdown/plain text)
        file: PathBuf,
    },
    /// Search the store with a free-text query
    Search {
        query: String,
        /// How many results to return
        #[arg(long)]
        top: Option<usize>,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Show store statistics
    Stats,
    /// Delete the advisory store (the whole store, not single records)
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.nongsa/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::NongsaConfig::load()?;

    // Log to stderr so stdout stays clean for results.
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Ingest { file } => {
            cli::ingest::ingest(&config, &file)?;
        }
        Command::Search { query, top } => {
            cli::search::search(&config, &query, top)?;
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model::model_download(&config.embedding).await?;
            }
        },
        Command::Stats => {
            cli::stats::stats(&config)?;
        }
        Command::Reset { yes } => {
            cli::reset::reset(&config, yes)?;
        }
    }

    Ok(())
}
