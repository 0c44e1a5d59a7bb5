//! Error types for the wiki search repository.
//!
//! This module provides the error type for full-text backend operations and the
//! error type for document collection and fallback search access.

mod collection_error;
mod search_index_error;

pub use collection_error::CollectionError;
pub use search_index_error::SearchIndexError;
