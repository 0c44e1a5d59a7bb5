//! OpenSearch implementation of the full-text backend.
//!
//! This module provides a concrete implementation of `FullTextBackend`
//! using OpenSearch as the backend.

mod index_config;
mod provider;

pub use index_config::IndexConfig;
pub use provider::OpenSearchBackend;
