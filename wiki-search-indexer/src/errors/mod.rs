//! Error types for query routing, document sync and background jobs.

use thiserror::Error;
use wiki_search_repository::{CollectionError, SearchIndexError};

/// Errors returned by [`QueryRouter::search`](crate::router::QueryRouter::search).
///
/// Full-text backend faults never surface here; the router answers them from the
/// fallback path instead.
#[derive(Error, Debug)]
pub enum SearchError {
    /// No space route is a prefix of the requested path.
    #[error("No space found for path '{path}'")]
    NoPartition { path: String },

    /// The fallback search failed.
    #[error("Fallback search error: {0}")]
    Fallback(String),

    /// The space list could not be read.
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),

    /// A full-text backend fault, handled inside the router.
    #[error("Full-text backend error: {0}")]
    Backend(#[from] SearchIndexError),
}

impl SearchError {
    /// Create a fallback error.
    pub fn fallback(msg: impl Into<String>) -> Self {
        Self::Fallback(msg.into())
    }
}

/// Errors from the document save / delete hooks.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No space route is a prefix of the document route.
    #[error("No space found for route '{route}'")]
    NoPartition { route: String },

    /// The backend rejected the write or the removal.
    #[error("Backend error: {0}")]
    Backend(#[from] SearchIndexError),

    /// The space list could not be read.
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),
}

/// Errors from submitting work to a job queue.
#[derive(Error, Debug, PartialEq)]
pub enum JobError {
    /// The queue's worker has stopped.
    #[error("Job queue '{0}' is closed")]
    QueueClosed(String),

    /// No tokio runtime is available to run the queue's worker.
    #[error("No runtime to run job queue '{0}'")]
    NoRuntime(String),
}
