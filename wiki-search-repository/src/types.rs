//! Request and response types for search index operations.

use crate::errors::SearchIndexError;

/// A full-text field in an index schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    /// The record field name (e.g., "title").
    pub name: String,
    /// Relative weight of matches in this field. 1.0 is the default weight.
    pub weight: f32,
}

impl TextField {
    /// Create a text field with the default weight.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: 1.0,
        }
    }

    /// Create a text field with a custom weight.
    pub fn weighted(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Definition of one space's full-text index.
///
/// The index covers every record whose key starts with `key_prefix`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    /// Index name. One index per space, named after the space route.
    pub name: String,
    /// Key prefix this index covers (e.g., "wiki_page_search_docdocs:").
    pub key_prefix: String,
    /// Indexed text fields.
    pub fields: Vec<TextField>,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, key_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_prefix: key_prefix.into(),
            fields: Vec::new(),
        }
    }

    /// Add a text field.
    pub fn text(mut self, field: TextField) -> Self {
        self.fields.push(field);
        self
    }

    /// Weight of a field, or `None` if the field is not part of the schema.
    pub fn weight_of(&self, field: &str) -> Option<f32> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.weight)
    }
}

/// Result ordering for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    pub field: String,
    pub descending: bool,
}

impl SortBy {
    /// Sort descending by `field` (e.g., most recently modified first).
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Sort ascending by `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }
}

/// A query against one space's index.
///
/// Terms of `query` are conjunctive; each term may match in any of `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Query in the backend's syntax (see [`QuerySyntax`]).
    pub query: String,
    /// Fields to search, with their weights.
    pub fields: Vec<TextField>,
    pub sort_by: Option<SortBy>,
    /// Return highlighted fragments instead of raw field values.
    pub highlight: bool,
    /// Return the stored content along with the hit.
    pub with_payloads: bool,
    pub offset: usize,
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, fields: Vec<TextField>) -> Self {
        Self {
            query: query.into(),
            fields,
            sort_by: None,
            highlight: false,
            with_payloads: false,
            offset: 0,
            limit: 20,
        }
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    pub fn highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_payloads(mut self, with_payloads: bool) -> Self {
        self.with_payloads = with_payloads;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Backend-specific query operators used by the query normalizer.
///
/// Wildcard and substring syntax is not portable across engines, so each backend
/// states its own markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySyntax {
    /// Appended to a term for prefix matching.
    pub prefix_marker: String,
    /// Placed before a term for substring matching.
    pub substring_open: String,
    /// Placed after a term for substring matching.
    pub substring_close: String,
}

impl QuerySyntax {
    pub fn new(
        prefix_marker: impl Into<String>,
        substring_open: impl Into<String>,
        substring_close: impl Into<String>,
    ) -> Self {
        Self {
            prefix_marker: prefix_marker.into(),
            substring_open: substring_open.into(),
            substring_close: substring_close.into(),
        }
    }

    /// RediSearch-style syntax: `term*` for prefixes and `%%term%%` for fuzzy
    /// substring matches.
    pub fn redisearch() -> Self {
        Self::new("*", "%%", "%%")
    }

    /// Lucene query-string syntax: `term*` and `*term*`.
    pub fn lucene() -> Self {
        Self::new("*", "*", "*")
    }
}

impl Default for QuerySyntax {
    fn default() -> Self {
        Self::redisearch()
    }
}

/// Result of a batch operation for a single document.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The document's identifier.
    pub id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// Batch operations are best-effort per item; this summary lets callers see partial
/// failures without the batch itself failing.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Record the outcome for one item.
    pub fn record(&mut self, id: impl Into<String>, outcome: Result<(), SearchIndexError>) {
        self.total += 1;
        match outcome {
            Ok(()) => {
                self.succeeded += 1;
                self.results.push(BatchOperationResult {
                    id: id.into(),
                    success: true,
                    error: None,
                });
            }
            Err(e) => {
                self.failed += 1;
                self.results.push(BatchOperationResult {
                    id: id.into(),
                    success: false,
                    error: Some(e),
                });
            }
        }
    }

    /// Iterate over the failed items.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}
