//! The two ways a search can be answered.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use wiki_search_repository::{FallbackSearch, SearchIndexService};
use wiki_search_shared::{ResultDoc, SearchEngine};

use crate::errors::SearchError;
use crate::normalizer::QueryNormalizer;

/// One way of answering a search within a space.
#[async_trait]
pub trait SearchPath: Send + Sync {
    /// The engine label reported in the response.
    fn engine(&self) -> SearchEngine;

    /// Search `partition` for the user's raw `query`.
    async fn search(&self, query: &str, partition: &str) -> Result<Vec<ResultDoc>, SearchError>;
}

/// Answers searches from the space's full-text index.
pub struct FullTextPath {
    service: Arc<SearchIndexService>,
    normalizer: QueryNormalizer,
}

impl FullTextPath {
    pub fn new(service: Arc<SearchIndexService>) -> Self {
        let normalizer = QueryNormalizer::for_backend(Arc::clone(service.backend()));
        Self {
            service,
            normalizer,
        }
    }
}

#[async_trait]
impl SearchPath for FullTextPath {
    fn engine(&self) -> SearchEngine {
        SearchEngine::Fulltext
    }

    async fn search(&self, query: &str, partition: &str) -> Result<Vec<ResultDoc>, SearchError> {
        let normalized = self.normalizer.normalize(query);
        if normalized.is_empty() {
            debug!(query = %query, "Query has no searchable terms");
            return Ok(Vec::new());
        }

        Ok(self.service.search(partition, &normalized).await?)
    }
}

/// Answers searches with the generic fallback search, scoped to the space route.
pub struct FallbackPath {
    search: Arc<dyn FallbackSearch>,
}

impl FallbackPath {
    pub fn new(search: Arc<dyn FallbackSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl SearchPath for FallbackPath {
    fn engine(&self) -> SearchEngine {
        SearchEngine::Fallback
    }

    async fn search(&self, query: &str, partition: &str) -> Result<Vec<ResultDoc>, SearchError> {
        let hits = self
            .search
            .web_search(query, partition)
            .await
            .map_err(|e| SearchError::fallback(e.to_string()))?;

        Ok(hits.into_iter().map(ResultDoc::from).collect())
    }
}
