//! Search result types for the wiki search indexer.
//!
//! This module defines the raw hits produced by the full-text backend and the
//! fallback search, and the engine-agnostic response returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single hit returned by the full-text backend.
///
/// When highlighting was requested, `title` and `content` carry the highlighted
/// fragments instead of the raw field values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// The record key the hit was stored under.
    pub key: String,
    pub title: String,
    pub content: String,
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Relevance score from the search engine.
    /// Higher scores indicate better matches.
    pub score: f64,
}

/// A single hit returned by the fallback search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FallbackHit {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_highlights: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_highlights: Option<String>,
    pub path: String,
}

/// Identifies which search path produced a response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    /// The per-space full-text index.
    Fulltext,
    /// The generic search over the document collection.
    Fallback,
}

impl SearchEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::Fulltext => "fulltext",
            SearchEngine::Fallback => "fallback",
        }
    }
}

/// An engine-agnostic search result.
///
/// Callers must not depend on which engine produced a result beyond
/// [`SearchResponse::search_engine`]. `name` (the document id) is only known to
/// the full-text path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultDoc {
    pub title: String,
    pub route: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<FallbackHit> for ResultDoc {
    fn from(hit: FallbackHit) -> Self {
        Self {
            title: hit.title_highlights.unwrap_or(hit.title),
            route: hit.path,
            content: hit.content_highlights.unwrap_or(hit.content),
            name: None,
        }
    }
}

/// Complete search response, serialized as `{"docs": [...], "search_engine": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub docs: Vec<ResultDoc>,
    pub search_engine: SearchEngine,
}

impl SearchResponse {
    pub fn new(docs: Vec<ResultDoc>, search_engine: SearchEngine) -> Self {
        Self {
            docs,
            search_engine,
        }
    }

    /// Returns true if there are no results.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Returns the number of results in this response.
    pub fn len(&self) -> usize {
        self.docs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_hit_prefers_highlights() {
        let hit = FallbackHit {
            title: "Intro".to_string(),
            title_highlights: Some("<mark>Intro</mark>".to_string()),
            content: "Hello World".to_string(),
            content_highlights: None,
            path: "docs/intro".to_string(),
        };

        let doc = ResultDoc::from(hit);
        assert_eq!(doc.title, "<mark>Intro</mark>");
        assert_eq!(doc.content, "Hello World");
        assert_eq!(doc.route, "docs/intro");
        assert!(doc.name.is_none());
    }

    #[test]
    fn test_response_serialization_shape() {
        let response = SearchResponse::new(
            vec![ResultDoc {
                title: "Intro".to_string(),
                route: "docs/intro".to_string(),
                content: "Hello".to_string(),
                name: Some("p1".to_string()),
            }],
            SearchEngine::Fulltext,
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["search_engine"], "fulltext");
        assert_eq!(json["docs"][0]["name"], "p1");
        assert_eq!(json["docs"][0]["route"], "docs/intro");
    }

    #[test]
    fn test_fallback_response_omits_name() {
        let response = SearchResponse::new(
            vec![ResultDoc::from(FallbackHit {
                title: "Intro".to_string(),
                path: "docs/intro".to_string(),
                ..Default::default()
            })],
            SearchEngine::Fallback,
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["search_engine"], "fallback");
        assert!(json["docs"][0].get("name").is_none());
        assert_eq!(response.len(), 1);
        assert!(!response.is_empty());
    }
}
