//! # Wiki Search Repository
//!
//! This crate provides traits and implementations for interacting with the
//! full-text search index and the wiki document collection. It includes
//! definitions for errors, interfaces, the per-space index lifecycle service,
//! a self-contained in-memory backend, and a concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod service;
pub mod types;
pub mod utils;

pub use config::SearchIndexServiceConfig;
pub use errors::{CollectionError, SearchIndexError};
pub use interfaces::{DocumentCollection, FallbackSearch, FullTextBackend};
pub use memory::{CollectionWebSearch, InMemoryBackend, InMemoryCollection, JsonFileCollection};
pub use opensearch::OpenSearchBackend;
pub use service::{ProgressMode, SearchIndexService};
pub use types::{
    BatchOperationResult, BatchOperationSummary, IndexDefinition, QuerySyntax, SearchRequest,
    SortBy, TextField,
};
