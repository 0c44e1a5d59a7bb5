//! Document types for the search index.
//!
//! This module defines the wiki document as owned by the document collection and
//! the record that is written to the search engine for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::markup::strip_html_tags;

/// A wiki document as stored in the document collection.
///
/// The partition ("space") a document belongs to is not stored on the document;
/// it is derived from `route` by longest-prefix match against the known space routes.
///
/// # Fields
///
/// - `id`: Unique identifier within the partition
/// - `title`: Display title (primary search field)
/// - `content`: HTML-bearing body (secondary search field)
/// - `route`: Hierarchical path, e.g. `docs/getting-started/install`
/// - `modified`: Last modification time, used to order search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WikiDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub route: String,
    #[serde(default = "Utc::now")]
    pub modified: DateTime<Utc>,
}

impl WikiDocument {
    /// Create a new document modified now.
    ///
    /// # Example
    ///
    /// ```
    /// use wiki_search_shared::WikiDocument;
    ///
    /// let doc = WikiDocument::new("p1", "Intro", "<p>Hello</p>", "docs/intro");
    /// assert_eq!(doc.route, "docs/intro");
    /// ```
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            route: route.into(),
            modified: Utc::now(),
        }
    }

    /// Set the modification time.
    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = modified;
        self
    }

    /// The identifying part of the document, as needed for removal.
    pub fn to_ref(&self) -> DocumentRef {
        DocumentRef {
            id: self.id.clone(),
            route: self.route.clone(),
        }
    }
}

/// Identifies a document to remove from the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentRef {
    /// The document's identifier within its partition.
    pub id: String,
    /// The document's route, used to resolve its partition.
    pub route: String,
}

impl DocumentRef {
    pub fn new(id: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            route: route.into(),
        }
    }
}

/// The indexed projection of a document.
///
/// Records are stored under a partition-scoped key so that one partition's index
/// only ever covers its own documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexRecord {
    /// Partition-scoped storage key, `<key_prefix><partition>:<id>`.
    pub key: String,
    pub title: String,
    /// Content with markup stripped.
    pub content: String,
    pub route: String,
    pub modified: DateTime<Utc>,
}

impl IndexRecord {
    /// Project a document into an index record stored under `key`.
    ///
    /// The document content is stripped of HTML markup.
    pub fn from_document(document: &WikiDocument, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: document.title.clone(),
            content: strip_html_tags(&document.content),
            route: document.route.clone(),
            modified: document.modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_strips_markup() {
        let doc = WikiDocument::new("p1", "Intro", "<p>Hello <b>World</b></p>", "docs/intro");
        let record = IndexRecord::from_document(&doc, "wiki_page_search_docdocs:p1");

        assert_eq!(record.key, "wiki_page_search_docdocs:p1");
        assert_eq!(record.title, "Intro");
        assert_eq!(record.content, "Hello World");
        assert_eq!(record.route, "docs/intro");
        assert_eq!(record.modified, doc.modified);
    }

    #[test]
    fn test_document_deserializes_without_modified() {
        let json = r#"{"id":"p1","title":"Intro","content":"x","route":"docs/intro"}"#;
        let doc: WikiDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, "p1");
        assert_eq!(doc.content, "x");
    }

    #[test]
    fn test_to_ref() {
        let doc = WikiDocument::new("p1", "Intro", "", "docs/intro");
        assert_eq!(doc.to_ref(), DocumentRef::new("p1", "docs/intro"));
    }
}
