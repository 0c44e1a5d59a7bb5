//! Dependency initialization and wiring for the wiki search indexer.

use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::api::{WikiSearch, WikiSearchConfig};
use crate::jobs::TokioJobRunner;
use crate::router::RouterConfig;
use crate::IndexingError;
use wiki_search_repository::opensearch::IndexConfig;
use wiki_search_repository::{
    CollectionWebSearch, DocumentCollection, FullTextBackend, InMemoryBackend, JsonFileCollection,
    OpenSearchBackend, SearchIndexServiceConfig,
};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default path of the JSON document collection.
const DEFAULT_DOCUMENTS_PATH: &str = "wiki.json";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection at the configured interval until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse connection mode from an environment value.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive)
    /// Defaults to "retry" if not set or invalid.
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("retry").to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Which full-text backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    OpenSearch,
    Memory,
    /// No full-text backend; every search uses the fallback search.
    None,
}

impl BackendKind {
    /// Parse the backend kind. Defaults to `memory` if not set.
    fn parse(value: Option<&str>) -> Result<Self, IndexingError> {
        match value.unwrap_or("memory").to_lowercase().as_str() {
            "opensearch" => Ok(Self::OpenSearch),
            "memory" => Ok(Self::Memory),
            "none" => Ok(Self::None),
            other => Err(IndexingError::config(format!(
                "Invalid WIKI_SEARCH_BACKEND '{}', expected opensearch, memory or none",
                other
            ))),
        }
    }
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The wired search facade.
    pub wiki_search: WikiSearch,
    /// The backend the facade was wired with.
    pub backend_kind: BackendKind,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `WIKI_SEARCH_BACKEND`: "opensearch", "memory" or "none" (default: memory)
    /// - `USE_FULLTEXT_SEARCH`: Route searches to the full-text index (default: true)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_CONNECTION_MODE`: Connection mode - "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `WIKI_DOCUMENTS_PATH`: JSON document collection (default: wiki.json)
    /// - `SEARCH_KEY_PREFIX`: Record key namespace (default: wiki_page_search_doc)
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails (OpenSearch only in fail-fast mode)
    pub async fn new() -> Result<Self, IndexingError> {
        let backend_kind = BackendKind::parse(env::var("WIKI_SEARCH_BACKEND").ok().as_deref())?;
        let use_fulltext = parse_flag(env::var("USE_FULLTEXT_SEARCH").ok().as_deref(), true);
        let documents_path =
            env::var("WIKI_DOCUMENTS_PATH").unwrap_or_else(|_| DEFAULT_DOCUMENTS_PATH.to_string());

        let mut service_config = SearchIndexServiceConfig::default();
        if let Ok(key_prefix) = env::var("SEARCH_KEY_PREFIX") {
            service_config.key_prefix = key_prefix;
        }

        info!(
            backend = ?backend_kind,
            use_fulltext = use_fulltext,
            documents_path = %documents_path,
            key_prefix = %service_config.key_prefix,
            "Initializing dependencies"
        );

        let collection: Arc<dyn DocumentCollection> =
            Arc::new(JsonFileCollection::new(documents_path));
        let fallback = Arc::new(CollectionWebSearch::new(Arc::clone(&collection)));

        let backend: Option<Arc<dyn FullTextBackend>> = match backend_kind {
            BackendKind::OpenSearch => Some(Arc::new(Self::opensearch_from_env().await?)),
            BackendKind::Memory => Some(Arc::new(InMemoryBackend::new())),
            BackendKind::None => None,
        };

        let wiki_search = WikiSearch::new(
            collection,
            backend,
            fallback,
            Arc::new(TokioJobRunner::new()),
            WikiSearchConfig {
                service: service_config,
                router: RouterConfig { use_fulltext },
            },
        );

        Ok(Self {
            wiki_search,
            backend_kind,
        })
    }

    async fn opensearch_from_env() -> Result<OpenSearchBackend, IndexingError> {
        let opensearch_url =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());
        let connection_mode =
            ConnectionMode::parse(env::var("OPENSEARCH_CONNECTION_MODE").ok().as_deref());
        let retry_interval = env::var("OPENSEARCH_RETRY_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS);

        info!(
            opensearch_url = %opensearch_url,
            connection_mode = ?connection_mode,
            retry_interval_secs = retry_interval,
            "Connecting to OpenSearch"
        );

        let backend = Self::connect_to_opensearch(
            &opensearch_url,
            IndexConfig::default(),
            connection_mode,
            Duration::from_secs(retry_interval),
        )
        .await?;

        info!("OpenSearch connection established");
        Ok(backend)
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        index_config: IndexConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchBackend, IndexingError> {
        loop {
            match Self::try_connect_opensearch(url, index_config.clone()).await {
                Ok(backend) => return Ok(backend),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(IndexingError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Attempt to connect to OpenSearch and check that it answers.
    async fn try_connect_opensearch(
        url: &str,
        index_config: IndexConfig,
    ) -> Result<OpenSearchBackend, IndexingError> {
        let backend = OpenSearchBackend::new(url, index_config)
            .await
            .map_err(|e| {
                IndexingError::config(format!("Failed to create OpenSearch backend: {}", e))
            })?;

        backend
            .ping()
            .await
            .map_err(|e| IndexingError::config(format!("OpenSearch is not reachable: {}", e)))?;

        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_mode_parse() {
        assert_eq!(ConnectionMode::parse(None), ConnectionMode::Retry);
        assert_eq!(ConnectionMode::parse(Some("Fail-Fast")), ConnectionMode::FailFast);
        assert_eq!(ConnectionMode::parse(Some("bogus")), ConnectionMode::Retry);
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!(BackendKind::parse(None).unwrap(), BackendKind::Memory);
        assert_eq!(
            BackendKind::parse(Some("OpenSearch")).unwrap(),
            BackendKind::OpenSearch
        );
        assert_eq!(BackendKind::parse(Some("none")).unwrap(), BackendKind::None);
        assert!(matches!(
            BackendKind::parse(Some("redis")),
            Err(IndexingError::ConfigError(_))
        ));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(None, true));
        assert!(!parse_flag(Some("false"), true));
        assert!(parse_flag(Some(" YES "), false));
        assert!(!parse_flag(Some("maybe"), false));
    }

    #[tokio::test]
    async fn test_fail_fast_on_bad_url() {
        let result = Dependencies::connect_to_opensearch(
            "not a url",
            IndexConfig::default(),
            ConnectionMode::FailFast,
            Duration::from_millis(1),
        )
        .await;
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }
}
