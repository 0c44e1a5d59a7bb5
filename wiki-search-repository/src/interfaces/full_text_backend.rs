//! Full-text backend trait definition.
//!
//! This module defines the abstract interface for full-text index operations,
//! allowing for different backend implementations (in-memory, OpenSearch, etc.).

use async_trait::async_trait;
use wiki_search_shared::{IndexRecord, SearchHit};

use crate::errors::SearchIndexError;
use crate::types::{IndexDefinition, QuerySyntax, SearchRequest};
use crate::utils;

/// Abstracts the underlying full-text engine.
///
/// Implementations are injected into `SearchIndexService` to enable dependency injection
/// and easy testing with mock implementations.
///
/// All methods return `Result<T, SearchIndexError>`. Implementations must report a
/// missing index as [`SearchIndexError::IndexNotFound`] and a missing document as
/// [`SearchIndexError::DocumentNotFound`] so that idempotent callers can swallow them.
#[async_trait]
pub trait FullTextBackend: Send + Sync {
    /// Create an index over all records whose key starts with `definition.key_prefix`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchIndexError::IndexAlreadyExists)` - If an index with that name exists
    async fn create_index(&self, definition: &IndexDefinition) -> Result<(), SearchIndexError>;

    /// Drop an index, optionally deleting the records it covers.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was dropped
    /// * `Err(SearchIndexError::IndexNotFound)` - If the index does not exist
    async fn drop_index(&self, name: &str, delete_documents: bool)
        -> Result<(), SearchIndexError>;

    /// Check whether an index exists.
    async fn index_exists(&self, name: &str) -> Result<bool, SearchIndexError>;

    /// Write a record, replacing every field of any record stored under the same key.
    ///
    /// `index` names the index the record key belongs to.
    async fn write_record(&self, index: &str, record: &IndexRecord)
        -> Result<(), SearchIndexError>;

    /// Delete the record stored under `key` from `index`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the record was deleted
    /// * `Err(SearchIndexError::DocumentNotFound)` - If no such record exists
    /// * `Err(SearchIndexError::IndexNotFound)` - If the index does not exist
    async fn delete_record(&self, index: &str, key: &str) -> Result<(), SearchIndexError>;

    /// Run a query against an index.
    async fn query(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<Vec<SearchHit>, SearchIndexError>;

    /// Strip characters that are unsafe in this backend's query language.
    fn clean_query(&self, raw: &str) -> String {
        utils::clean_query(raw)
    }

    /// The prefix and substring operators of this backend's query language.
    fn query_syntax(&self) -> QuerySyntax {
        QuerySyntax::default()
    }
}
