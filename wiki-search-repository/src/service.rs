//! Search index service implementation.
//!
//! This module provides the main service for maintaining the per-space indexes.
//! Application code uses it to create and drop a space's index, upsert and remove
//! documents, and run full-text queries against a space.
//!
//! # Keys
//!
//! Every record is stored under `<key_prefix><space>:<document id>` and a space's index
//! covers exactly the keys starting with `<key_prefix><space>:`.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};
use wiki_search_shared::{DocumentRef, IndexRecord, ResultDoc, WikiDocument};

use crate::config::SearchIndexServiceConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::FullTextBackend;
use crate::types::{BatchOperationSummary, IndexDefinition, SearchRequest, SortBy, TextField};
use crate::utils;

/// Whether an upsert runs inside an interactive request or as a background job.
///
/// Only background upserts report progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    Interactive,
    Background,
}

/// The main service for maintaining the wiki search indexes.
///
/// This is the high-level API that application code should use. It owns key naming
/// and the index schema, and delegates to a `FullTextBackend` for actual backend
/// operations. Idempotent operations (drop, remove) treat "not found" as success.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use wiki_search_repository::{InMemoryBackend, ProgressMode, SearchIndexService};
/// use wiki_search_shared::WikiDocument;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = SearchIndexService::new(Arc::new(InMemoryBackend::new()));
///
/// service.create_index("docs").await?;
/// let doc = WikiDocument::new("p1", "Intro", "<p>Hello</p>", "docs/intro");
/// service.upsert(&[doc], "docs", ProgressMode::Interactive).await;
///
/// let results = service.search("docs", "hello*").await?;
/// # Ok(())
/// # }
/// ```
pub struct SearchIndexService {
    backend: Arc<dyn FullTextBackend>,
    config: SearchIndexServiceConfig,
}

impl SearchIndexService {
    /// Create a new SearchIndexService with default configuration.
    ///
    /// # Arguments
    ///
    /// * `backend` - A shared implementation of `FullTextBackend` (e.g., `OpenSearchBackend`)
    pub fn new(backend: Arc<dyn FullTextBackend>) -> Self {
        Self {
            backend,
            config: SearchIndexServiceConfig::default(),
        }
    }

    /// Create a new SearchIndexService with custom configuration.
    pub fn with_config(backend: Arc<dyn FullTextBackend>, config: SearchIndexServiceConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &Arc<dyn FullTextBackend> {
        &self.backend
    }

    pub fn config(&self) -> &SearchIndexServiceConfig {
        &self.config
    }

    fn validate_partition(partition: &str) -> Result<(), SearchIndexError> {
        if partition.trim().is_empty() {
            return Err(SearchIndexError::validation("partition is required"));
        }
        Ok(())
    }

    /// The key prefix covered by a space's index.
    pub fn index_prefix(&self, partition: &str) -> String {
        utils::index_key_prefix(&self.config.key_prefix, partition)
    }

    /// The storage key of a document in a space.
    pub fn record_key(&self, partition: &str, id: &str) -> String {
        utils::record_key(&self.config.key_prefix, partition, id)
    }

    fn search_fields(&self) -> Vec<TextField> {
        vec![
            TextField::weighted("title", self.config.title_weight),
            TextField::weighted("content", self.config.content_weight),
        ]
    }

    /// The index schema of a space: `title` (boosted) and `content`.
    pub fn index_definition(&self, partition: &str) -> IndexDefinition {
        self.search_fields().into_iter().fold(
            IndexDefinition::new(partition, self.index_prefix(partition)),
            IndexDefinition::text,
        )
    }

    /// Create a space's index, dropping any previous index and its records first.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was (re)created
    /// * `Err(SearchIndexError)` - If the drop or the creation was rejected
    #[instrument(skip(self))]
    pub async fn create_index(&self, partition: &str) -> Result<(), SearchIndexError> {
        Self::validate_partition(partition)?;

        self.drop_index(partition).await?;
        self.backend
            .create_index(&self.index_definition(partition))
            .await?;

        info!(partition = %partition, "Created space index");
        Ok(())
    }

    /// Drop a space's index and every record it covers.
    ///
    /// A missing index is not an error.
    #[instrument(skip(self))]
    pub async fn drop_index(&self, partition: &str) -> Result<(), SearchIndexError> {
        Self::validate_partition(partition)?;

        match self.backend.drop_index(partition, true).await {
            Ok(()) => {
                debug!(partition = %partition, "Dropped space index");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(partition = %partition, "Space index did not exist");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Check whether a space's index exists.
    pub async fn index_exists(&self, partition: &str) -> Result<bool, SearchIndexError> {
        Self::validate_partition(partition)?;
        self.backend.index_exists(partition).await
    }

    /// Write documents into a space's index.
    ///
    /// Content is stripped of markup and the full field set (title, content, route,
    /// modified) is written under the document's key. Writes are best-effort per
    /// document: failures are logged and reported in the summary, never raised.
    ///
    /// # Arguments
    ///
    /// * `documents` - The documents to index
    /// * `partition` - The space whose index receives the documents
    /// * `progress` - Background upserts above the progress threshold log percentage progress
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub async fn upsert(
        &self,
        documents: &[WikiDocument],
        partition: &str,
        progress: ProgressMode,
    ) -> BatchOperationSummary {
        let mut summary = BatchOperationSummary::default();

        if let Err(e) = Self::validate_partition(partition) {
            for doc in documents {
                summary.record(doc.id.as_str(), Err(e.clone()));
            }
            return summary;
        }

        let total = documents.len();
        let report_progress =
            progress == ProgressMode::Background && total > self.config.progress_threshold;
        let step = (total / 10).max(1);
        let index_prefix = self.index_prefix(partition);

        // Owned futures keep the stream `Send` inside spawned jobs.
        let pending: Vec<_> = documents
            .iter()
            .map(|doc| {
                let backend = Arc::clone(&self.backend);
                let partition = partition.to_string();
                let id = doc.id.clone();
                let record = IndexRecord::from_document(doc, format!("{}{}", index_prefix, id));
                async move {
                    let outcome = backend.write_record(&partition, &record).await;
                    (id, outcome)
                }
            })
            .collect();
        let writes = stream::iter(pending).buffered(self.config.upsert_concurrency.max(1));
        futures::pin_mut!(writes);

        while let Some((id, outcome)) = writes.next().await {
            if let Err(ref e) = outcome {
                warn!(partition = %partition, id = %id, error = %e, "Failed to index document");
            }
            summary.record(id, outcome);

            if report_progress && (summary.total % step == 0 || summary.total == total) {
                info!(
                    partition = %partition,
                    indexed = summary.total,
                    total = total,
                    percent = summary.total * 100 / total,
                    "Indexing wiki documents"
                );
            }
        }

        debug!(
            partition = %partition,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Upsert completed"
        );
        summary
    }

    /// Remove documents from a space's index.
    ///
    /// Removal is idempotent: a missing document or a missing index counts as success.
    /// Other backend faults are logged and reported in the summary.
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub async fn remove(&self, documents: &[DocumentRef], partition: &str) -> BatchOperationSummary {
        let mut summary = BatchOperationSummary::default();

        for doc in documents {
            let outcome = match Self::validate_partition(partition) {
                Ok(()) => {
                    let key = self.record_key(partition, &doc.id);
                    match self.backend.delete_record(partition, &key).await {
                        Err(e) if e.is_not_found() => {
                            debug!(key = %key, "Document was not indexed");
                            Ok(())
                        }
                        other => other,
                    }
                }
                Err(e) => Err(e),
            };

            if let Err(ref e) = outcome {
                warn!(partition = %partition, id = %doc.id, error = %e, "Failed to remove document");
            }
            summary.record(doc.id.as_str(), outcome);
        }

        summary
    }

    /// Run a normalized query against a space's index.
    ///
    /// Searches `title` and `content`, newest first, with highlighting and payloads.
    /// The document id of each hit is recovered from its key.
    ///
    /// # Arguments
    ///
    /// * `partition` - The space to search
    /// * `query` - A query already in the backend's syntax
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        partition: &str,
        query: &str,
    ) -> Result<Vec<ResultDoc>, SearchIndexError> {
        Self::validate_partition(partition)?;

        let request = SearchRequest::new(query, self.search_fields())
            .sort_by(SortBy::desc("modified"))
            .highlight(true)
            .with_payloads(true)
            .limit(self.config.result_limit);

        let hits = self.backend.query(partition, &request).await?;
        let index_prefix = self.index_prefix(partition);

        debug!(partition = %partition, hit_count = hits.len(), "Query completed");

        Ok(hits
            .into_iter()
            .map(|hit| ResultDoc {
                name: Some(utils::document_id_from_key(&hit.key, &index_prefix).to_string()),
                title: hit.title,
                route: hit.route,
                content: hit.content,
            })
            .collect())
    }
}
