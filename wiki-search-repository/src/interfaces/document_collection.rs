//! Document collection trait definition.

use async_trait::async_trait;
use wiki_search_shared::{PartitionSet, WikiDocument};

use crate::errors::CollectionError;

/// The source of truth for wiki documents and spaces.
///
/// The index service never writes to the collection; rebuilds read from it.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// List the routes of every space, in the collection's order.
    async fn list_partitions(&self) -> Result<Vec<String>, CollectionError>;

    /// List every document in the collection.
    async fn list_documents(&self) -> Result<Vec<WikiDocument>, CollectionError>;

    /// List the documents indexed under `partition`.
    ///
    /// The default implementation filters [`list_documents`](Self::list_documents)
    /// by the partition ownership rules: longest-prefix match, versioned sub-trees
    /// excluded.
    async fn get_documents_by_partition(
        &self,
        partition: &str,
    ) -> Result<Vec<WikiDocument>, CollectionError> {
        let partitions = PartitionSet::new(self.list_partitions().await?);
        Ok(self
            .list_documents()
            .await?
            .into_iter()
            .filter(|doc| partitions.owns(partition, &doc.route))
            .collect())
    }
}
