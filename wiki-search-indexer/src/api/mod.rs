//! Public entry points of the wiki search.

use std::sync::Arc;

use tracing::info;
use wiki_search_repository::{
    CollectionError, DocumentCollection, FallbackSearch, FullTextBackend, SearchIndexService,
    SearchIndexServiceConfig,
};
use wiki_search_shared::{DocumentRef, SearchResponse, WikiDocument};

use crate::errors::{SearchError, SyncError};
use crate::jobs::JobRunner;
use crate::orchestrator::{RebuildOrchestrator, RebuildSummary};
use crate::router::{FallbackPath, FullTextPath, QueryRouter, RouterConfig, SearchPath};
use crate::sync::DocumentSync;

/// Configuration for [`WikiSearch`].
#[derive(Debug, Clone, Default)]
pub struct WikiSearchConfig {
    pub service: SearchIndexServiceConfig,
    pub router: RouterConfig,
}

struct Indexing {
    orchestrator: Arc<RebuildOrchestrator>,
    sync: DocumentSync,
}

/// Search and index maintenance for a wiki.
///
/// Without a full-text backend every search goes to the fallback search, and the
/// rebuild and sync entry points do nothing.
pub struct WikiSearch {
    router: QueryRouter,
    indexing: Option<Indexing>,
}

impl WikiSearch {
    /// Wire the components.
    ///
    /// # Arguments
    ///
    /// * `collection` - Source of documents and spaces
    /// * `backend` - The full-text engine, if one is configured
    /// * `fallback` - Search used when the full-text path is disabled or failing
    /// * `jobs` - Runner for background rebuilds
    /// * `config` - Key naming, weights and routing switches
    pub fn new(
        collection: Arc<dyn DocumentCollection>,
        backend: Option<Arc<dyn FullTextBackend>>,
        fallback: Arc<dyn FallbackSearch>,
        jobs: Arc<dyn JobRunner>,
        config: WikiSearchConfig,
    ) -> Self {
        let service = backend
            .map(|backend| Arc::new(SearchIndexService::with_config(backend, config.service)));

        let fulltext = service
            .clone()
            .map(|service| Box::new(FullTextPath::new(service)) as Box<dyn SearchPath>);

        let router = QueryRouter::new(
            Arc::clone(&collection),
            fulltext,
            Box::new(FallbackPath::new(fallback)),
            config.router,
        );

        let indexing = service.map(|service| Indexing {
            orchestrator: Arc::new(RebuildOrchestrator::new(
                Arc::clone(&collection),
                Arc::clone(&service),
                jobs,
            )),
            sync: DocumentSync::new(collection, service),
        });

        Self { router, indexing }
    }

    /// Search a space. See [`QueryRouter::search`].
    pub async fn search(
        &self,
        query: &str,
        path: &str,
        space: Option<&str>,
    ) -> Result<SearchResponse, SearchError> {
        self.router.search(query, path, space).await
    }

    /// Rebuild every space's index now.
    pub async fn rebuild_index(&self) -> Result<RebuildSummary, CollectionError> {
        match &self.indexing {
            Some(indexing) => indexing.orchestrator.rebuild_all().await,
            None => {
                info!("No full-text backend configured, nothing to rebuild");
                Ok(RebuildSummary::default())
            }
        }
    }

    /// Queue a rebuild on the background job runner. Returns `true` if one was queued.
    pub fn rebuild_index_in_background(&self) -> bool {
        self.indexing
            .as_ref()
            .is_some_and(|indexing| indexing.orchestrator.rebuild_in_background())
    }

    /// Hook for a created or edited document.
    pub async fn on_document_saved(&self, document: &WikiDocument) -> Result<(), SyncError> {
        match &self.indexing {
            Some(indexing) => indexing.sync.on_document_saved(document).await,
            None => Ok(()),
        }
    }

    /// Hook for a deleted document.
    pub async fn on_document_deleted(&self, document: &DocumentRef) -> Result<(), SyncError> {
        match &self.indexing {
            Some(indexing) => indexing.sync.on_document_deleted(document).await,
            None => Ok(()),
        }
    }

    /// Whether searches currently use the full-text index.
    pub fn fulltext_enabled(&self) -> bool {
        self.router.fulltext_enabled()
    }

    pub fn orchestrator(&self) -> Option<&Arc<RebuildOrchestrator>> {
        self.indexing.as_ref().map(|indexing| &indexing.orchestrator)
    }
}
