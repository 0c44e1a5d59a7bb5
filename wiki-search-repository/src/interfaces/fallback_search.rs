//! Fallback search trait definition.

use async_trait::async_trait;
use wiki_search_shared::FallbackHit;

use crate::errors::CollectionError;

/// A generic, non-index-backed search used when the full-text backend is disabled
/// or unavailable.
#[async_trait]
pub trait FallbackSearch: Send + Sync {
    /// Search documents under the `scope` route for `query`.
    async fn web_search(
        &self,
        query: &str,
        scope: &str,
    ) -> Result<Vec<FallbackHit>, CollectionError>;
}
