//! Document save / delete hooks.
//!
//! Keeps a space's index in step with single-document edits between rebuilds.

use std::sync::Arc;

use tracing::{debug, instrument};
use wiki_search_repository::{
    BatchOperationSummary, DocumentCollection, ProgressMode, SearchIndexError, SearchIndexService,
};
use wiki_search_shared::{belongs_to_partition, DocumentRef, PartitionSet, WikiDocument};

use crate::errors::SyncError;

/// Applies document edits to the owning space's index.
pub struct DocumentSync {
    collection: Arc<dyn DocumentCollection>,
    service: Arc<SearchIndexService>,
}

impl DocumentSync {
    pub fn new(collection: Arc<dyn DocumentCollection>, service: Arc<SearchIndexService>) -> Self {
        Self {
            collection,
            service,
        }
    }

    async fn resolve(&self, route: &str) -> Result<String, SyncError> {
        let partitions = PartitionSet::new(self.collection.list_partitions().await?);
        partitions
            .resolve(route)
            .map(str::to_string)
            .ok_or_else(|| SyncError::NoPartition {
                route: route.to_string(),
            })
    }

    fn first_error(summary: BatchOperationSummary) -> Result<(), SyncError> {
        match summary.results.into_iter().find_map(|r| r.error) {
            Some(e) => Err(SyncError::Backend(e)),
            None if summary.failed > 0 => Err(SyncError::Backend(SearchIndexError::unknown(
                "write failed without an error",
            ))),
            None => Ok(()),
        }
    }

    /// Index a saved document in its space.
    ///
    /// A document in a versioned sub-tree of its space is not indexed; any record
    /// left from before it moved there is removed.
    #[instrument(skip(self, document), fields(id = %document.id, route = %document.route))]
    pub async fn on_document_saved(&self, document: &WikiDocument) -> Result<(), SyncError> {
        let partition = self.resolve(&document.route).await?;

        if !belongs_to_partition(&partition, &document.route) {
            debug!(partition = %partition, "Versioned document is not indexed");
            let summary = self.service.remove(&[document.to_ref()], &partition).await;
            return Self::first_error(summary);
        }

        let summary = self
            .service
            .upsert(std::slice::from_ref(document), &partition, ProgressMode::Interactive)
            .await;
        Self::first_error(summary)
    }

    /// Remove a deleted document from its space's index. Removing a document that was
    /// never indexed succeeds.
    #[instrument(skip(self))]
    pub async fn on_document_deleted(&self, document: &DocumentRef) -> Result<(), SyncError> {
        let partition = self.resolve(&document.route).await?;
        let summary = self
            .service
            .remove(std::slice::from_ref(document), &partition)
            .await;
        Self::first_error(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiki_search_repository::{FullTextBackend, InMemoryBackend, InMemoryCollection};

    async fn setup() -> (DocumentSync, Arc<InMemoryBackend>, Arc<SearchIndexService>) {
        let backend = Arc::new(InMemoryBackend::new());
        let service = Arc::new(SearchIndexService::new(backend.clone()));
        service.create_index("docs").await.unwrap();

        let collection = Arc::new(InMemoryCollection::new(vec!["docs".to_string()], Vec::new()));
        (DocumentSync::new(collection, service.clone()), backend, service)
    }

    #[tokio::test]
    async fn test_saved_document_is_searchable() {
        let (sync, _, service) = setup().await;

        sync.on_document_saved(&WikiDocument::new("p1", "Intro", "<p>Hello</p>", "docs/intro"))
            .await
            .unwrap();

        let results = service.search("docs", "hello*").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_saving_into_version_path_removes_record() {
        let (sync, backend, _) = setup().await;
        sync.on_document_saved(&WikiDocument::new("p1", "Intro", "", "docs/intro"))
            .await
            .unwrap();

        sync.on_document_saved(&WikiDocument::new("p1", "Intro", "", "docs/v2/intro"))
            .await
            .unwrap();

        assert!(backend.get_record("wiki_page_search_docdocs:p1").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (sync, backend, _) = setup().await;
        let doc = WikiDocument::new("p1", "Intro", "", "docs/intro");
        sync.on_document_saved(&doc).await.unwrap();

        sync.on_document_deleted(&doc.to_ref()).await.unwrap();
        sync.on_document_deleted(&doc.to_ref()).await.unwrap();

        assert!(backend.get_record("wiki_page_search_docdocs:p1").await.is_none());
        assert!(backend.index_exists("docs").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_space() {
        let (sync, _, _) = setup().await;
        let result = sync
            .on_document_saved(&WikiDocument::new("x", "X", "", "blog/x"))
            .await;
        assert!(matches!(result, Err(SyncError::NoPartition { ref route }) if route == "blog/x"));
    }
}
