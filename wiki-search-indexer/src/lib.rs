//! # Wiki Search Indexer
//!
//! Search index manager for a wiki: routes searches to a per-space full-text index or
//! to a fallback search, and keeps the indexes in sync with the document collection.
//!
//! ## Architecture
//!
//! 1. **Normalizer**: Turns free text into backend query syntax
//! 2. **Router**: Picks the full-text or the fallback path per search
//! 3. **Orchestrator**: Rebuilds every space's index, single-flight
//! 4. **Sync**: Applies single-document saves and deletes
//! 5. **Jobs**: Runs rebuilds in the background
//!
//! ## Modules
//!
//! - [`api`]: The [`WikiSearch`] facade
//! - [`config`]: Configuration and dependency initialization
//! - [`errors`]: Error types for routing, sync and jobs
//! - [`jobs`]: Background job queues
//! - [`normalizer`]: Query normalization
//! - [`orchestrator`]: Bulk reindexing
//! - [`router`]: Query routing
//! - [`sync`]: Document save / delete hooks

pub mod api;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod normalizer;
pub mod orchestrator;
pub mod router;
pub mod sync;

pub use api::{WikiSearch, WikiSearchConfig};
pub use config::Dependencies;
pub use errors::{JobError, SearchError, SyncError};
pub use jobs::{JobRunner, TokioJobRunner};
pub use normalizer::QueryNormalizer;
pub use orchestrator::{IndexState, RebuildOrchestrator, RebuildSummary};
pub use router::{QueryRouter, RouterConfig};

use thiserror::Error;
use wiki_search_repository::CollectionError;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The document collection could not be read.
    #[error("Collection error: {0}")]
    CollectionError(#[from] CollectionError),

    /// A search failed.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// Output could not be encoded.
    #[error("Output error: {0}")]
    OutputError(#[from] serde_json::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
