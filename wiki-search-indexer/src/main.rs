//! Wiki Search Indexer Main Entry Point
//!
//! Rebuilds the per-space search indexes from the document collection, or runs a
//! search and prints the JSON response.

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wiki_search_indexer::config::BackendKind;
use wiki_search_indexer::{Dependencies, IndexingError};

/// Wiki search index manager.
#[derive(Parser, Debug)]
#[command(name = "wiki-search-indexer", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drop and rebuild every space's index from the document collection.
    Rebuild,

    /// Search a space and print the JSON response.
    Search {
        /// Free-text query.
        query: String,

        /// Path of the page the search is issued from.
        #[arg(long)]
        path: String,

        /// Space to search; resolved from the path when omitted.
        #[arg(long)]
        space: Option<String>,
    },
}

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wiki_search_indexer=info,wiki_search_repository=info"));

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| IndexingError::config(e.to_string()))?;

        info!(
            service_name = "wiki-search-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| IndexingError::config(e.to_string()))?;

        info!(
            service_name = "wiki-search-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

async fn run(command: Command, deps: Dependencies) -> Result<(), IndexingError> {
    let wiki_search = deps.wiki_search;

    match command {
        Command::Rebuild => {
            let summary = wiki_search.rebuild_index().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Search { query, path, space } => {
            // The in-memory index lives only as long as this process.
            if deps.backend_kind == BackendKind::Memory && wiki_search.fulltext_enabled() {
                wiki_search.rebuild_index().await?;
            }
            let response = wiki_search.search(&query, &path, space.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    init_tracing()?;

    info!("Starting Wiki Search Indexer");

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match run(cli.command, deps).await {
        Ok(()) => {
            info!("Wiki search indexer completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Wiki search indexer failed");
            Err(e)
        }
    }
}
