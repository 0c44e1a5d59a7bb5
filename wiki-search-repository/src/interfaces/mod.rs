//! Interface definitions for the wiki search collaborators.
//!
//! This module defines the abstract traits the index service and the query router
//! consume: the full-text backend, the document collection, and the fallback search.
//! They allow dependency injection and swappable implementations.

mod document_collection;
mod fallback_search;
mod full_text_backend;

pub use document_collection::DocumentCollection;
pub use fallback_search::FallbackSearch;
pub use full_text_backend::FullTextBackend;
