//! Scan-based fallback search over a document collection.

use std::sync::Arc;

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use tracing::debug;
use wiki_search_shared::{belongs_to_partition, strip_html_tags, FallbackHit, WikiDocument};

use crate::errors::CollectionError;
use crate::interfaces::{DocumentCollection, FallbackSearch};

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";
const DEFAULT_LIMIT: usize = 20;
const SNIPPET_CONTEXT: usize = 80;

/// Fallback search that scans every document under the scope route.
///
/// A document matches when every whitespace-separated query term occurs in its title
/// or its tag-stripped content, ignoring case. Title matches are listed first.
pub struct CollectionWebSearch {
    collection: Arc<dyn DocumentCollection>,
    limit: usize,
}

impl CollectionWebSearch {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self {
            collection,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn term_pattern(terms: &[String]) -> Result<Regex, CollectionError> {
        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .map_err(|e| CollectionError::parse(e.to_string()))
    }

    fn to_hit(document: &WikiDocument, text: &str, pattern: &Regex) -> FallbackHit {
        let title_highlights = pattern
            .is_match(&document.title)
            .then(|| mark(&document.title, pattern));

        let content_highlights = pattern
            .find(text)
            .map(|m| mark(&snippet(text, m.start(), m.end()), pattern));

        FallbackHit {
            title: document.title.clone(),
            title_highlights,
            content: text.to_string(),
            content_highlights,
            path: document.route.clone(),
        }
    }
}

fn mark(text: &str, pattern: &Regex) -> String {
    pattern
        .replace_all(text, |caps: &regex::Captures| {
            format!("{}{}{}", MARK_OPEN, &caps[0], MARK_CLOSE)
        })
        .into_owned()
}

/// Cut a window of roughly `SNIPPET_CONTEXT` bytes either side of `start..end`,
/// moved outwards to the nearest char boundaries.
fn snippet(text: &str, start: usize, end: usize) -> String {
    let mut from = start.saturating_sub(SNIPPET_CONTEXT);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + SNIPPET_CONTEXT).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }

    let mut out = String::new();
    if from > 0 {
        out.push_str("...");
    }
    out.push_str(text[from..to].trim());
    if to < text.len() {
        out.push_str("...");
    }
    out
}

#[async_trait]
impl FallbackSearch for CollectionWebSearch {
    async fn web_search(
        &self,
        query: &str,
        scope: &str,
    ) -> Result<Vec<FallbackHit>, CollectionError> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = Self::term_pattern(&terms)?;

        let mut title_hits = Vec::new();
        let mut content_hits = Vec::new();

        for document in self.collection.list_documents().await? {
            if !belongs_to_partition(scope, &document.route) {
                continue;
            }
            let text = strip_html_tags(&document.content);
            let title = document.title.to_lowercase();
            let body = text.to_lowercase();

            if !terms
                .iter()
                .all(|t| title.contains(t.as_str()) || body.contains(t.as_str()))
            {
                continue;
            }

            let hit = Self::to_hit(&document, &text, &pattern);
            if hit.title_highlights.is_some() {
                title_hits.push(hit);
            } else {
                content_hits.push(hit);
            }
        }

        debug!(
            scope = %scope,
            title_hits = title_hits.len(),
            content_hits = content_hits.len(),
            "Fallback search scanned collection"
        );

        title_hits.extend(content_hits);
        title_hits.truncate(self.limit);
        Ok(title_hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCollection;

    fn search() -> CollectionWebSearch {
        let collection = InMemoryCollection::new(
            vec!["docs".to_string()],
            vec![
                WikiDocument::new("p1", "Setup", "<p>How to <b>install</b> things</p>", "docs/setup"),
                WikiDocument::new("p2", "Install guide", "<p>Read me</p>", "docs/install"),
                WikiDocument::new("p3", "Install v2", "<p>Old</p>", "docs/v2/install"),
                WikiDocument::new("p4", "Install blog", "", "blog/install"),
            ],
        );
        CollectionWebSearch::new(Arc::new(collection))
    }

    #[tokio::test]
    async fn test_title_matches_first_and_scope_respected() {
        let hits = search().web_search("install", "docs").await.unwrap();

        let paths: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(paths, vec!["docs/install", "docs/setup"]);
        assert_eq!(
            hits[0].title_highlights.as_deref(),
            Some("<mark>Install</mark> guide")
        );
        assert_eq!(hits[1].title_highlights, None);
        assert_eq!(
            hits[1].content_highlights.as_deref(),
            Some("How to <mark>install</mark> things")
        );
        assert_eq!(hits[1].content, "How to install things");
    }

    #[tokio::test]
    async fn test_all_terms_required() {
        let hits = search().web_search("install things", "docs").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "docs/setup");

        assert!(search().web_search("   ", "docs").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_regex_metacharacters_are_literal() {
        assert!(search().web_search("in.tall", "docs").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_limit() {
        let hits = search()
            .with_limit(1)
            .web_search("install", "docs")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        let text = format!("{}needle{}", "é".repeat(100), "ü".repeat(100));
        let start = text.find("needle").unwrap();
        let cut = snippet(&text, start, start + 6);
        assert!(cut.starts_with("..."));
        assert!(cut.ends_with("..."));
        assert!(cut.contains("needle"));
    }
}
