//! This module defines the core data structures used across the wiki search indexer.
//! It re-exports the document and search result types.

pub mod document;
pub mod search_result;

pub use document::{DocumentRef, IndexRecord, WikiDocument};
pub use search_result::{FallbackHit, ResultDoc, SearchEngine, SearchHit, SearchResponse};
