//! Bulk reindex orchestrator.
//!
//! Rebuilds every space's index from the full document collection. Rebuilds are
//! single-flight: a background request while one is queued or running is dropped,
//! and a direct rebuild while one is running is skipped.

mod state;

pub use state::{IndexState, IndexStatus, RebuildGuard};

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument, warn};
use wiki_search_repository::{CollectionError, DocumentCollection, ProgressMode, SearchIndexService};

use crate::jobs::{JobRunner, LONG_QUEUE};

/// Result of rebuilding one space.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PartitionOutcome {
    pub partition: String,
    /// Documents written to the index.
    pub indexed: usize,
    /// Documents whose write failed.
    pub failed: usize,
    /// Set when the space could not be rebuilt at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a full rebuild.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RebuildSummary {
    /// `true` when another rebuild was already running and nothing was done.
    pub skipped: bool,
    pub partitions: Vec<PartitionOutcome>,
}

impl RebuildSummary {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            partitions: Vec::new(),
        }
    }

    /// Total documents indexed across all spaces.
    pub fn indexed(&self) -> usize {
        self.partitions.iter().map(|p| p.indexed).sum()
    }

    /// Spaces that could not be rebuilt.
    pub fn errors(&self) -> impl Iterator<Item = &PartitionOutcome> {
        self.partitions.iter().filter(|p| p.error.is_some())
    }
}

/// Rebuilds the per-space indexes.
pub struct RebuildOrchestrator {
    collection: Arc<dyn DocumentCollection>,
    service: Arc<SearchIndexService>,
    jobs: Arc<dyn JobRunner>,
    status: IndexStatus,
}

impl RebuildOrchestrator {
    pub fn new(
        collection: Arc<dyn DocumentCollection>,
        service: Arc<SearchIndexService>,
        jobs: Arc<dyn JobRunner>,
    ) -> Self {
        Self {
            collection,
            service,
            jobs,
            status: IndexStatus::new(),
        }
    }

    /// Current admission state.
    pub fn state(&self) -> IndexState {
        self.status.get()
    }

    /// Rebuild every space's index now.
    ///
    /// Spaces are processed in collection order. For each space the index is dropped
    /// and recreated, then every document the space owns is written. A failure in one
    /// space is logged and recorded; the remaining spaces are still rebuilt.
    ///
    /// # Returns
    ///
    /// * `Ok(RebuildSummary)` - Per-space outcome, or a `skipped` summary if a rebuild was running
    /// * `Err(CollectionError)` - If the list of spaces could not be read
    #[instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<RebuildSummary, CollectionError> {
        let Some(_guard) = self.status.try_begin() else {
            info!("Index rebuild already in progress, skipping");
            return Ok(RebuildSummary::skipped());
        };
        self.rebuild_partitions().await
    }

    /// Run the rebuild a background request queued.
    ///
    /// Skips when a direct rebuild started after the request was queued.
    #[instrument(skip(self))]
    pub async fn run_queued(&self) -> Result<RebuildSummary, CollectionError> {
        let Some(_guard) = self.status.begin_queued() else {
            info!("Queued index rebuild already covered by a later rebuild, skipping");
            return Ok(RebuildSummary::skipped());
        };
        self.rebuild_partitions().await
    }

    async fn rebuild_partitions(&self) -> Result<RebuildSummary, CollectionError> {
        let partitions = self.collection.list_partitions().await?;
        info!(partition_count = partitions.len(), "Rebuilding space indexes");

        let mut summary = RebuildSummary::default();
        for partition in partitions {
            let outcome = self.rebuild_partition(&partition).await;
            if let Some(ref e) = outcome.error {
                error!(partition = %partition, error = %e, "Failed to rebuild space index");
            }
            summary.partitions.push(outcome);
        }

        info!(
            partitions = summary.partitions.len(),
            indexed = summary.indexed(),
            failed_partitions = summary.errors().count(),
            "Index rebuild completed"
        );
        Ok(summary)
    }

    async fn rebuild_partition(&self, partition: &str) -> PartitionOutcome {
        let mut outcome = PartitionOutcome {
            partition: partition.to_string(),
            indexed: 0,
            failed: 0,
            error: None,
        };

        if let Err(e) = self.service.create_index(partition).await {
            outcome.error = Some(e.to_string());
            return outcome;
        }

        let documents = match self.collection.get_documents_by_partition(partition).await {
            Ok(documents) => documents,
            Err(e) => {
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };

        let result = self
            .service
            .upsert(&documents, partition, ProgressMode::Background)
            .await;
        if result.failed > 0 {
            warn!(
                partition = %partition,
                succeeded = result.succeeded,
                failed = result.failed,
                "Space rebuilt with failed documents"
            );
        }

        outcome.indexed = result.succeeded;
        outcome.failed = result.failed;
        outcome
    }

    /// Queue a rebuild on the long-running job queue.
    ///
    /// Only the first request while idle is queued; later requests are dropped until
    /// the queued job has run. A direct rebuild in between covers the request and the
    /// job skips.
    ///
    /// # Returns
    ///
    /// `true` if a rebuild was queued.
    pub fn rebuild_in_background(self: &Arc<Self>) -> bool {
        if !self.status.try_queue() {
            info!(state = ?self.status.get(), "Index rebuild already queued or running");
            return false;
        }

        let orchestrator = Arc::clone(self);
        let job = Box::pin(async move {
            if let Err(e) = orchestrator.run_queued().await {
                error!(error = %e, "Background index rebuild failed");
            }
        });

        match self.jobs.enqueue(job, LONG_QUEUE) {
            Ok(()) => {
                info!(queue = LONG_QUEUE, "Index rebuild queued");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to queue index rebuild");
                self.status.cancel_queued();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JobError;
    use crate::jobs::Job;
    use std::sync::Mutex;
    use wiki_search_repository::{FullTextBackend, InMemoryBackend, InMemoryCollection};
    use wiki_search_shared::WikiDocument;

    /// Holds jobs until the test runs them.
    #[derive(Default)]
    struct ManualJobRunner {
        jobs: Mutex<Vec<(String, Job)>>,
    }

    impl ManualJobRunner {
        fn take(&self) -> Vec<(String, Job)> {
            std::mem::take(&mut *self.jobs.lock().unwrap())
        }
    }

    impl JobRunner for ManualJobRunner {
        fn enqueue(&self, job: Job, queue: &str) -> Result<(), JobError> {
            self.jobs.lock().unwrap().push((queue.to_string(), job));
            Ok(())
        }
    }

    struct ClosedJobRunner;

    impl JobRunner for ClosedJobRunner {
        fn enqueue(&self, _job: Job, queue: &str) -> Result<(), JobError> {
            Err(JobError::QueueClosed(queue.to_string()))
        }
    }

    fn collection() -> Arc<InMemoryCollection> {
        Arc::new(InMemoryCollection::new(
            vec!["docs".to_string(), "blog".to_string()],
            vec![
                WikiDocument::new("p1", "Intro", "<p>Hello</p>", "docs/intro"),
                WikiDocument::new("p2", "Old", "<p>Hello</p>", "docs/v2/intro"),
                WikiDocument::new("b1", "Post", "<p>Hello</p>", "blog/post"),
            ],
        ))
    }

    fn orchestrator(jobs: Arc<dyn JobRunner>) -> (Arc<RebuildOrchestrator>, Arc<InMemoryBackend>) {
        let backend = Arc::new(InMemoryBackend::new());
        let service = Arc::new(SearchIndexService::new(backend.clone()));
        (
            Arc::new(RebuildOrchestrator::new(collection(), service, jobs)),
            backend,
        )
    }

    #[tokio::test]
    async fn test_rebuild_all_indexes_each_partition() {
        let (orchestrator, backend) = orchestrator(Arc::new(ManualJobRunner::default()));

        let summary = orchestrator.rebuild_all().await.unwrap();

        assert!(!summary.skipped);
        let counts: Vec<(&str, usize)> = summary
            .partitions
            .iter()
            .map(|p| (p.partition.as_str(), p.indexed))
            .collect();
        assert_eq!(counts, vec![("docs", 1), ("blog", 1)]);
        assert!(backend.index_exists("docs").await.unwrap());
        assert!(backend.index_exists("blog").await.unwrap());
        assert_eq!(orchestrator.state(), IndexState::Idle);
    }

    #[tokio::test]
    async fn test_rebuild_replaces_stale_records() {
        let (orchestrator, backend) = orchestrator(Arc::new(ManualJobRunner::default()));
        orchestrator.rebuild_all().await.unwrap();

        let stale = wiki_search_shared::IndexRecord::from_document(
            &WikiDocument::new("gone", "Gone", "", "docs/gone"),
            "wiki_page_search_docdocs:gone",
        );
        backend.write_record("docs", &stale).await.unwrap();
        assert!(backend.get_record("wiki_page_search_docdocs:gone").await.is_some());

        orchestrator.rebuild_all().await.unwrap();

        assert!(backend.get_record("wiki_page_search_docdocs:gone").await.is_none());
        assert!(backend.get_record("wiki_page_search_docdocs:p1").await.is_some());
    }

    #[tokio::test]
    async fn test_rebuild_skipped_while_in_progress() {
        let (orchestrator, _) = orchestrator(Arc::new(ManualJobRunner::default()));

        let _guard = orchestrator.status.try_begin().unwrap();
        let summary = orchestrator.rebuild_all().await.unwrap();

        assert!(summary.skipped);
        assert!(summary.partitions.is_empty());
    }

    #[tokio::test]
    async fn test_background_requests_enqueue_once() {
        let jobs = Arc::new(ManualJobRunner::default());
        let (orchestrator, backend) = orchestrator(jobs.clone());

        assert!(orchestrator.rebuild_in_background());
        assert!(!orchestrator.rebuild_in_background());
        assert_eq!(orchestrator.state(), IndexState::Queued);

        let queued = jobs.take();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].0, LONG_QUEUE);

        for (_, job) in queued {
            job.await;
        }
        assert_eq!(orchestrator.state(), IndexState::Idle);
        assert!(backend.index_exists("docs").await.unwrap());

        assert!(orchestrator.rebuild_in_background());
    }

    #[tokio::test]
    async fn test_direct_rebuild_covers_queued_request() {
        let jobs = Arc::new(ManualJobRunner::default());
        let (orchestrator, backend) = orchestrator(jobs.clone());

        assert!(orchestrator.rebuild_in_background());
        let summary = orchestrator.rebuild_all().await.unwrap();
        assert!(!summary.skipped);

        // The request is still pending, so no second job is admitted.
        assert_eq!(orchestrator.state(), IndexState::Queued);
        assert!(!orchestrator.rebuild_in_background());

        let queued = jobs.take();
        assert_eq!(queued.len(), 1);

        backend.drop_index("docs", true).await.unwrap();
        for (_, job) in queued {
            job.await;
        }

        assert!(!backend.index_exists("docs").await.unwrap());
        assert_eq!(orchestrator.state(), IndexState::Idle);
        assert!(orchestrator.rebuild_in_background());
        assert_eq!(jobs.take().len(), 1);
    }

    #[tokio::test]
    async fn test_run_queued_skips_after_direct_rebuild() {
        let (orchestrator, _) = orchestrator(Arc::new(ManualJobRunner::default()));

        assert!(orchestrator.rebuild_in_background());
        orchestrator.rebuild_all().await.unwrap();

        let summary = orchestrator.run_queued().await.unwrap();
        assert!(summary.skipped);
        assert_eq!(orchestrator.state(), IndexState::Idle);
    }

    #[tokio::test]
    async fn test_enqueue_failure_resets_state() {
        let (orchestrator, _) = orchestrator(Arc::new(ClosedJobRunner));

        assert!(!orchestrator.rebuild_in_background());
        assert_eq!(orchestrator.state(), IndexState::Idle);
    }
}
