//! Document collections held in memory or loaded from a JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use wiki_search_shared::WikiDocument;

use crate::errors::CollectionError;
use crate::interfaces::DocumentCollection;

/// A mutable document collection kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    partitions: RwLock<Vec<String>>,
    documents: RwLock<Vec<WikiDocument>>,
}

impl InMemoryCollection {
    pub fn new(partitions: Vec<String>, documents: Vec<WikiDocument>) -> Self {
        Self {
            partitions: RwLock::new(partitions),
            documents: RwLock::new(documents),
        }
    }

    /// Register a space route. Already known routes are ignored.
    pub async fn add_partition(&self, route: impl Into<String>) {
        let route = route.into();
        let mut partitions = self.partitions.write().await;
        if !partitions.contains(&route) {
            partitions.push(route);
        }
    }

    /// Insert a document, replacing any document with the same id and route.
    pub async fn upsert_document(&self, document: WikiDocument) {
        let mut documents = self.documents.write().await;
        match documents
            .iter_mut()
            .find(|doc| doc.id == document.id && doc.route == document.route)
        {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }

    /// Remove a document by id and route. Returns whether a document was removed.
    pub async fn delete_document(&self, id: &str, route: &str) -> bool {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|doc| !(doc.id == id && doc.route == route));
        documents.len() != before
    }
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    async fn list_partitions(&self) -> Result<Vec<String>, CollectionError> {
        Ok(self.partitions.read().await.clone())
    }

    async fn list_documents(&self) -> Result<Vec<WikiDocument>, CollectionError> {
        Ok(self.documents.read().await.clone())
    }
}

#[derive(Debug, Deserialize)]
struct CollectionFile {
    #[serde(default)]
    spaces: Vec<String>,
    #[serde(default)]
    documents: Vec<WikiDocument>,
}

/// A read-only collection backed by a JSON file of the form
/// `{ "spaces": [...], "documents": [...] }`.
///
/// The file is read on every call so edits are picked up by the next rebuild.
#[derive(Debug, Clone)]
pub struct JsonFileCollection {
    path: PathBuf,
}

impl JsonFileCollection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<CollectionFile, CollectionError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CollectionError::io(format!("{}: {}", self.path.display(), e))
        })?;

        let file: CollectionFile = serde_json::from_str(&raw).map_err(|e| {
            CollectionError::parse(format!("{}: {}", self.path.display(), e))
        })?;

        debug!(
            path = %self.path.display(),
            spaces = file.spaces.len(),
            documents = file.documents.len(),
            "Loaded document collection"
        );
        Ok(file)
    }
}

#[async_trait]
impl DocumentCollection for JsonFileCollection {
    async fn list_partitions(&self) -> Result<Vec<String>, CollectionError> {
        Ok(self.load().await?.spaces)
    }

    async fn list_documents(&self) -> Result<Vec<WikiDocument>, CollectionError> {
        let documents = self.load().await?.documents;
        info!(path = %self.path.display(), count = documents.len(), "Read documents from file");
        Ok(documents)
    }
}
