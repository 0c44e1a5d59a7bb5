//! Query routing between the full-text index and the fallback search.
//!
//! The path is chosen once per call. A full-text fault is logged and the same call
//! is answered by the fallback path, so backend errors never reach the caller.

mod paths;

pub use paths::{FallbackPath, FullTextPath, SearchPath};

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use wiki_search_repository::DocumentCollection;
use wiki_search_shared::{PartitionSet, SearchResponse};

use crate::errors::SearchError;

/// Configuration for the query router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Use the full-text index when a backend is configured.
    pub use_fulltext: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { use_fulltext: true }
    }
}

/// Routes searches to the full-text path or the fallback path.
pub struct QueryRouter {
    collection: Arc<dyn DocumentCollection>,
    fulltext: Option<Box<dyn SearchPath>>,
    fallback: Box<dyn SearchPath>,
    config: RouterConfig,
}

impl QueryRouter {
    /// Create a router. Pass `None` for `fulltext` when no backend is configured.
    pub fn new(
        collection: Arc<dyn DocumentCollection>,
        fulltext: Option<Box<dyn SearchPath>>,
        fallback: Box<dyn SearchPath>,
        config: RouterConfig,
    ) -> Self {
        Self {
            collection,
            fulltext,
            fallback,
            config,
        }
    }

    /// Whether searches currently go to the full-text index.
    pub fn fulltext_enabled(&self) -> bool {
        self.config.use_fulltext && self.fulltext.is_some()
    }

    async fn resolve_partition(
        &self,
        path: &str,
        partition: Option<&str>,
    ) -> Result<String, SearchError> {
        if let Some(partition) = partition.filter(|p| !p.trim().is_empty()) {
            return Ok(partition.to_string());
        }

        let partitions = PartitionSet::new(self.collection.list_partitions().await?);
        partitions
            .resolve(path)
            .map(str::to_string)
            .ok_or_else(|| SearchError::NoPartition {
                path: path.to_string(),
            })
    }

    /// Search a space.
    ///
    /// # Arguments
    ///
    /// * `query` - The user's raw query
    /// * `path` - The page the search was issued from; resolves the space when `partition` is absent
    /// * `partition` - The space to search, if known
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - Results and the engine that produced them
    /// * `Err(SearchError::NoPartition)` - If no space covers `path`
    /// * `Err(SearchError::Fallback)` - If the fallback search failed
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        path: &str,
        partition: Option<&str>,
    ) -> Result<SearchResponse, SearchError> {
        let partition = self.resolve_partition(path, partition).await?;

        let fulltext = self
            .fulltext
            .as_deref()
            .filter(|_| self.config.use_fulltext);

        if let Some(fulltext) = fulltext {
            match fulltext.search(query, &partition).await {
                Ok(docs) => {
                    debug!(partition = %partition, result_count = docs.len(), "Full-text search completed");
                    return Ok(SearchResponse::new(docs, fulltext.engine()));
                }
                Err(e) => {
                    warn!(
                        partition = %partition,
                        error = %e,
                        "Full-text search failed, using fallback search"
                    );
                }
            }
        }

        let docs = self.fallback.search(query, &partition).await?;
        debug!(partition = %partition, result_count = docs.len(), "Fallback search completed");
        Ok(SearchResponse::new(docs, self.fallback.engine()))
    }
}
