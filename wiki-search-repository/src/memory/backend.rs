//! In-memory full-text backend.
//!
//! Records are kept in a sorted key space shared by all indexes, the way a key-value
//! store with a search module would hold them. An index is a named definition over a
//! key prefix; dropping it can leave or delete the records under that prefix.
//!
//! # Query language
//!
//! ```text
//! term          - a word equal to `term`
//! term*         - a word starting with `term`
//! %%term%%      - a word containing `term`, or within one edit of it
//! a b           - both `a` and `b` (each in any searched field)
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use wiki_search_shared::{IndexRecord, SearchHit};

use crate::errors::SearchIndexError;
use crate::interfaces::FullTextBackend;
use crate::types::{IndexDefinition, QuerySyntax, SearchRequest};

const HIGHLIGHT_OPEN: &str = "<b>";
const HIGHLIGHT_CLOSE: &str = "</b>";

/// Substring terms shorter than this only match literally.
const FUZZY_MIN_TERM_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq)]
enum QueryTerm {
    Exact(String),
    Prefix(String),
    Substring(String),
}

impl QueryTerm {
    fn parse(token: &str, syntax: &QuerySyntax) -> Self {
        let wrapped_len = syntax.substring_open.len() + syntax.substring_close.len();
        if token.len() > wrapped_len
            && token.starts_with(&syntax.substring_open)
            && token.ends_with(&syntax.substring_close)
        {
            let inner = &token[syntax.substring_open.len()..token.len() - syntax.substring_close.len()];
            return Self::Substring(inner.to_lowercase());
        }
        if let Some(stem) = token.strip_suffix(syntax.prefix_marker.as_str()) {
            return Self::Prefix(stem.to_lowercase());
        }
        Self::Exact(token.to_lowercase())
    }

    /// `word` must already be lowercase.
    fn matches(&self, word: &str) -> bool {
        match self {
            Self::Exact(term) => word == term,
            Self::Prefix(stem) => word.starts_with(stem.as_str()),
            Self::Substring(term) => {
                word.contains(term.as_str())
                    || (term.chars().count() >= FUZZY_MIN_TERM_LEN
                        && strsim::levenshtein(word, term) <= 1)
            }
        }
    }
}

/// Byte ranges of the words in `text`. A word is a run of alphanumerics or `_`.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        let is_word = c.is_alphanumeric() || c == '_';
        match (is_word, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

fn field_matches(text: &str, term: &QueryTerm) -> bool {
    word_spans(text)
        .into_iter()
        .any(|(s, e)| term.matches(&text[s..e].to_lowercase()))
}

fn highlight(text: &str, terms: &[QueryTerm]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for (s, e) in word_spans(text) {
        let word = text[s..e].to_lowercase();
        if terms.iter().any(|t| t.matches(&word)) {
            out.push_str(&text[last..s]);
            out.push_str(HIGHLIGHT_OPEN);
            out.push_str(&text[s..e]);
            out.push_str(HIGHLIGHT_CLOSE);
            last = e;
        }
    }
    out.push_str(&text[last..]);
    out
}

fn field_text<'a>(record: &'a IndexRecord, field: &str) -> Option<&'a str> {
    match field {
        "title" => Some(&record.title),
        "content" => Some(&record.content),
        "route" => Some(&record.route),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    indexes: HashMap<String, IndexDefinition>,
    records: BTreeMap<String, IndexRecord>,
}

impl MemoryState {
    fn records_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a IndexRecord> + 'a {
        self.records
            .range(prefix.to_string()..)
            .take_while(move |(key, _)| key.starts_with(prefix))
            .map(|(_, record)| record)
    }
}

/// Self-contained full-text backend held in process memory.
///
/// Safe to share across tasks; reads run concurrently and writes are serialized.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: RwLock<MemoryState>,
    syntax: QuerySyntax,
}

impl InMemoryBackend {
    /// Create an empty backend using RediSearch-style query syntax.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored under `prefix`, indexed or not.
    pub async fn record_count(&self, prefix: &str) -> usize {
        self.state.read().await.records_under(prefix).count()
    }

    /// Fetch a stored record by key.
    pub async fn get_record(&self, key: &str) -> Option<IndexRecord> {
        self.state.read().await.records.get(key).cloned()
    }

    fn score(
        record: &IndexRecord,
        terms: &[QueryTerm],
        request: &SearchRequest,
        definition: &IndexDefinition,
    ) -> Option<f64> {
        let mut score = 0.0;

        for term in terms {
            let best = request
                .fields
                .iter()
                .filter(|field| definition.weight_of(&field.name).is_some())
                .filter_map(|field| {
                    let text = field_text(record, &field.name)?;
                    field_matches(text, term).then_some(field.weight as f64)
                })
                .fold(None, |best: Option<f64>, w| Some(best.map_or(w, |b| b.max(w))))?;
            score += best;
        }

        Some(score)
    }
}

#[async_trait]
impl FullTextBackend for InMemoryBackend {
    async fn create_index(&self, definition: &IndexDefinition) -> Result<(), SearchIndexError> {
        let mut state = self.state.write().await;
        if state.indexes.contains_key(&definition.name) {
            return Err(SearchIndexError::index_already_exists(&definition.name));
        }
        state
            .indexes
            .insert(definition.name.clone(), definition.clone());

        debug!(index = %definition.name, prefix = %definition.key_prefix, "Created in-memory index");
        Ok(())
    }

    async fn drop_index(
        &self,
        name: &str,
        delete_documents: bool,
    ) -> Result<(), SearchIndexError> {
        let mut state = self.state.write().await;
        let definition = state
            .indexes
            .remove(name)
            .ok_or_else(|| SearchIndexError::index_not_found(name))?;

        if delete_documents {
            state
                .records
                .retain(|key, _| !key.starts_with(&definition.key_prefix));
        }

        debug!(index = %name, delete_documents, "Dropped in-memory index");
        Ok(())
    }

    async fn index_exists(&self, name: &str) -> Result<bool, SearchIndexError> {
        Ok(self.state.read().await.indexes.contains_key(name))
    }

    async fn write_record(
        &self,
        _index: &str,
        record: &IndexRecord,
    ) -> Result<(), SearchIndexError> {
        if record.key.is_empty() {
            return Err(SearchIndexError::validation("record key is required"));
        }
        self.state
            .write()
            .await
            .records
            .insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn delete_record(&self, index: &str, key: &str) -> Result<(), SearchIndexError> {
        let mut state = self.state.write().await;
        let prefix = state
            .indexes
            .get(index)
            .map(|definition| definition.key_prefix.clone())
            .ok_or_else(|| SearchIndexError::index_not_found(index))?;

        if !key.starts_with(&prefix) || state.records.remove(key).is_none() {
            return Err(SearchIndexError::document_not_found(index, key));
        }
        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<Vec<SearchHit>, SearchIndexError> {
        let state = self.state.read().await;
        let definition = state
            .indexes
            .get(index)
            .ok_or_else(|| SearchIndexError::index_not_found(index))?;

        let terms: Vec<QueryTerm> = request
            .query
            .split_whitespace()
            .map(|token| QueryTerm::parse(token, &self.syntax))
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut matched: Vec<(f64, &IndexRecord)> = state
            .records_under(&definition.key_prefix)
            .filter_map(|record| {
                Self::score(record, &terms, request, definition).map(|score| (score, record))
            })
            .collect();

        matched.sort_by(|(score_a, a), (score_b, b)| {
            let by_score = score_b.partial_cmp(score_a).unwrap_or(Ordering::Equal);
            let ordering = match &request.sort_by {
                Some(sort) if sort.field == "modified" => {
                    let by_modified = if sort.descending {
                        b.modified.cmp(&a.modified)
                    } else {
                        a.modified.cmp(&b.modified)
                    };
                    by_modified.then(by_score)
                }
                _ => by_score,
            };
            ordering.then_with(|| a.key.cmp(&b.key))
        });

        Ok(matched
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .map(|(score, record)| {
                let render = |text: &str| {
                    if request.highlight {
                        highlight(text, &terms)
                    } else {
                        text.to_string()
                    }
                };
                SearchHit {
                    key: record.key.clone(),
                    title: render(&record.title),
                    content: if request.with_payloads {
                        render(&record.content)
                    } else {
                        String::new()
                    },
                    route: record.route.clone(),
                    modified: Some(record.modified),
                    score,
                }
            })
            .collect())
    }

    fn query_syntax(&self) -> QuerySyntax {
        self.syntax.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SortBy, TextField};
    use chrono::{Duration, Utc};

    fn definition(name: &str) -> IndexDefinition {
        IndexDefinition::new(name, format!("wiki:{}:", name))
            .text(TextField::weighted("title", 3.0))
            .text(TextField::new("content"))
    }

    fn record(index: &str, id: &str, title: &str, content: &str, age_days: i64) -> IndexRecord {
        IndexRecord {
            key: format!("wiki:{}:{}", index, id),
            title: title.to_string(),
            content: content.to_string(),
            route: format!("{}/{}", index, id),
            modified: Utc::now() - Duration::days(age_days),
        }
    }

    fn request(query: &str) -> SearchRequest {
        SearchRequest::new(
            query,
            vec![TextField::weighted("title", 3.0), TextField::new("content")],
        )
        .with_payloads(true)
    }

    async fn backend_with(records: Vec<IndexRecord>) -> InMemoryBackend {
        let backend = InMemoryBackend::new();
        backend.create_index(&definition("docs")).await.unwrap();
        for r in records {
            backend.write_record("docs", &r).await.unwrap();
        }
        backend
    }

    #[test]
    fn test_query_term_parse() {
        let syntax = QuerySyntax::redisearch();
        assert_eq!(QueryTerm::parse("Cat", &syntax), QueryTerm::Exact("cat".into()));
        assert_eq!(QueryTerm::parse("cat*", &syntax), QueryTerm::Prefix("cat".into()));
        assert_eq!(
            QueryTerm::parse("%%cat%%", &syntax),
            QueryTerm::Substring("cat".into())
        );
        assert_eq!(QueryTerm::parse("%%%%", &syntax), QueryTerm::Exact("%%%%".into()));
    }

    #[test]
    fn test_substring_term_tolerates_one_edit() {
        let term = QueryTerm::Substring("install".into());
        assert!(term.matches("installation"));
        assert!(term.matches("instal"));
        assert!(!term.matches("setup"));

        let short = QueryTerm::Substring("cat".into());
        assert!(short.matches("concatenate"));
        assert!(!short.matches("car"));
    }

    #[test]
    fn test_highlight_wraps_matching_words() {
        let terms = vec![QueryTerm::Prefix("hel".into())];
        assert_eq!(
            highlight("Hello, World! help", &terms),
            "<b>Hello</b>, World! <b>help</b>"
        );
        assert_eq!(highlight("nothing here", &terms), "nothing here");
    }

    #[tokio::test]
    async fn test_create_existing_index_fails() {
        let backend = InMemoryBackend::new();
        backend.create_index(&definition("docs")).await.unwrap();

        let result = backend.create_index(&definition("docs")).await;
        assert!(matches!(result, Err(SearchIndexError::IndexAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_drop_missing_index_is_not_found() {
        let backend = InMemoryBackend::new();
        let result = backend.drop_index("docs", true).await;
        assert!(matches!(result, Err(SearchIndexError::IndexNotFound(_))));
    }

    #[tokio::test]
    async fn test_drop_deletes_only_own_records() {
        let backend = backend_with(vec![record("docs", "p1", "Intro", "hello", 0)]).await;
        backend.create_index(&definition("blog")).await.unwrap();
        backend
            .write_record("blog", &record("blog", "b1", "Post", "hello", 0))
            .await
            .unwrap();

        backend.drop_index("blog", true).await.unwrap();

        assert_eq!(backend.record_count("wiki:blog:").await, 0);
        assert_eq!(backend.record_count("wiki:docs:").await, 1);
        let hits = backend.query("docs", &request("hello")).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_drop_without_deleting_documents_keeps_records() {
        let backend = backend_with(vec![record("docs", "p1", "Intro", "hello", 0)]).await;
        backend.drop_index("docs", false).await.unwrap();

        assert_eq!(backend.record_count("wiki:docs:").await, 1);

        backend.create_index(&definition("docs")).await.unwrap();
        let hits = backend.query("docs", &request("hello")).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_query_terms_are_conjunctive_across_fields() {
        let backend = backend_with(vec![
            record("docs", "p1", "Install guide", "run the setup script", 0),
            record("docs", "p2", "Install", "nothing else", 0),
        ])
        .await;

        let hits = backend
            .query("docs", &request("%%install%% %%setup%%"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "wiki:docs:p1");
    }

    #[tokio::test]
    async fn test_query_prefix_and_exact() {
        let backend = backend_with(vec![record("docs", "p1", "Intro", "Hello World", 0)]).await;

        assert_eq!(backend.query("docs", &request("hel*")).await.unwrap().len(), 1);
        assert_eq!(backend.query("docs", &request("hello")).await.unwrap().len(), 1);
        assert!(backend.query("docs", &request("hel")).await.unwrap().is_empty());
        assert!(backend.query("docs", &request("")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_title_matches_outrank_content_matches() {
        let backend = backend_with(vec![
            record("docs", "p1", "Other", "about rust", 0),
            record("docs", "p2", "Rust", "other", 0),
        ])
        .await;

        let hits = backend.query("docs", &request("rust")).await.unwrap();
        assert_eq!(hits[0].key, "wiki:docs:p2");
        assert_eq!(hits[0].score, 3.0);
        assert_eq!(hits[1].score, 1.0);
    }

    #[tokio::test]
    async fn test_sort_by_modified_desc() {
        let backend = backend_with(vec![
            record("docs", "old", "Rust", "rust", 10),
            record("docs", "new", "Other", "rust", 1),
        ])
        .await;

        let hits = backend
            .query("docs", &request("rust").sort_by(SortBy::desc("modified")))
            .await
            .unwrap();
        assert_eq!(hits[0].key, "wiki:docs:new");
        assert_eq!(hits[1].key, "wiki:docs:old");
    }

    #[tokio::test]
    async fn test_highlight_and_payloads() {
        let backend = backend_with(vec![record("docs", "p1", "Intro", "Hello World", 0)]).await;

        let hits = backend
            .query("docs", &request("hello*").highlight(true))
            .await
            .unwrap();
        assert_eq!(hits[0].content, "<b>Hello</b> World");
        assert_eq!(hits[0].title, "Intro");

        let hits = backend
            .query("docs", &request("hello*").with_payloads(false))
            .await
            .unwrap();
        assert_eq!(hits[0].content, "");
    }

    #[tokio::test]
    async fn test_offset_and_limit() {
        let backend = backend_with(
            (0..5)
                .map(|i| record("docs", &format!("p{}", i), "Page", "shared", i))
                .collect(),
        )
        .await;

        let hits = backend
            .query(
                "docs",
                &request("shared")
                    .sort_by(SortBy::desc("modified"))
                    .offset(1)
                    .limit(2),
            )
            .await
            .unwrap();
        let keys: Vec<&str> = hits.iter().map(|h| h.key.as_str()).collect();
        assert_eq!(keys, vec!["wiki:docs:p1", "wiki:docs:p2"]);
    }

    #[tokio::test]
    async fn test_delete_record() {
        let backend = backend_with(vec![record("docs", "p1", "Intro", "hello", 0)]).await;

        backend.delete_record("docs", "wiki:docs:p1").await.unwrap();
        let again = backend.delete_record("docs", "wiki:docs:p1").await;
        assert!(matches!(again, Err(SearchIndexError::DocumentNotFound(_))));

        let missing_index = backend.delete_record("blog", "wiki:blog:p1").await;
        assert!(matches!(missing_index, Err(SearchIndexError::IndexNotFound(_))));
    }

    #[tokio::test]
    async fn test_query_missing_index() {
        let backend = InMemoryBackend::new();
        let result = backend.query("docs", &request("hello")).await;
        assert!(matches!(result, Err(SearchIndexError::IndexNotFound(_))));
    }
}
