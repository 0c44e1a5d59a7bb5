//! Configuration types for the SearchIndexService.

/// Default namespace prepended to every record key.
pub const DEFAULT_KEY_PREFIX: &str = "wiki_page_search_doc";

/// Configuration for the SearchIndexService.
///
/// This struct allows customization of key naming, field weights, and how the upsert
/// pipeline reports progress and spreads writes.
#[derive(Debug, Clone)]
pub struct SearchIndexServiceConfig {
    /// Namespace prepended to record keys; a space's records live under
    /// `<key_prefix><space>:`.
    pub key_prefix: String,
    /// Weight of the `title` field relative to `content`.
    pub title_weight: f32,
    /// Weight of the `content` field.
    pub content_weight: f32,
    /// Background upserts of more than this many documents report progress.
    pub progress_threshold: usize,
    /// Maximum number of record writes in flight during an upsert.
    pub upsert_concurrency: usize,
    /// Maximum number of hits returned by a search.
    pub result_limit: usize,
}

impl Default for SearchIndexServiceConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            title_weight: 3.0,
            content_weight: 1.0,
            progress_threshold: 10,
            upsert_concurrency: 8,
            result_limit: 20,
        }
    }
}

impl SearchIndexServiceConfig {
    /// Create a config with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `key_prefix` - Namespace prepended to every record key
    pub fn with_key_prefix(key_prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            ..Self::default()
        }
    }

    /// Set the number of concurrent record writes. Values below 1 are raised to 1.
    pub fn upsert_concurrency(mut self, concurrency: usize) -> Self {
        self.upsert_concurrency = concurrency.max(1);
        self
    }

    /// Set the document count above which background upserts report progress.
    pub fn progress_threshold(mut self, threshold: usize) -> Self {
        self.progress_threshold = threshold;
        self
    }

    /// Set the maximum number of hits returned by a search.
    pub fn result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }
}
