//! Free-text input to backend query syntax.

use std::sync::Arc;

use wiki_search_repository::{utils, FullTextBackend, QuerySyntax};

/// Turns a user's search box input into a backend query.
///
/// - one term: prefix match (`cat` -> `cat*`)
/// - several terms: every term must occur as a substring (`cat dog` -> `%%cat%% %%dog%%`)
///
/// Operator characters come from the backend's [`QuerySyntax`], and unsafe characters are
/// removed by the backend's `clean_query` before the query is split.
pub struct QueryNormalizer {
    syntax: QuerySyntax,
    backend: Option<Arc<dyn FullTextBackend>>,
}

impl QueryNormalizer {
    /// Normalizer for the query language of `backend`.
    pub fn for_backend(backend: Arc<dyn FullTextBackend>) -> Self {
        Self {
            syntax: backend.query_syntax(),
            backend: Some(backend),
        }
    }

    /// Normalizer with fixed operators and the default query cleaning.
    pub fn with_syntax(syntax: QuerySyntax) -> Self {
        Self {
            syntax,
            backend: None,
        }
    }

    pub fn syntax(&self) -> &QuerySyntax {
        &self.syntax
    }

    fn clean(&self, raw: &str) -> String {
        match &self.backend {
            Some(backend) => backend.clean_query(raw),
            None => utils::clean_query(raw),
        }
    }

    /// Normalize `raw`. Never fails; input with no usable terms yields `""`.
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = self.clean(raw);
        let terms: Vec<&str> = cleaned.split_whitespace().collect();
        let marker = self.syntax.prefix_marker.as_str();

        match terms.as_slice() {
            [] => String::new(),
            [term] if term.ends_with(marker) => term.to_string(),
            [term] => format!("{}{}", term, marker),
            _ => terms
                .iter()
                .map(|t| t.trim_end_matches(marker))
                .filter(|t| !t.is_empty())
                .map(|t| format!("{}{}{}", self.syntax.substring_open, t, self.syntax.substring_close))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::with_syntax(QuerySyntax::default())
    }
}
