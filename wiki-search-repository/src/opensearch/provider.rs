//! OpenSearch backend implementation.
//!
//! This module provides the concrete implementation of `FullTextBackend`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opensearch::{
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts},
    DeleteParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;
use wiki_search_shared::{IndexRecord, SearchHit};

use crate::errors::SearchIndexError;
use crate::interfaces::FullTextBackend;
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use crate::types::{IndexDefinition, QuerySyntax, SearchRequest};

const HIGHLIGHT_PRE_TAG: &str = "<b>";
const HIGHLIGHT_POST_TAG: &str = "</b>";

/// OpenSearch backend implementation.
///
/// Each space maps to one physical index named by [`IndexConfig::physical_name`].
/// Record keys are used as document ids.
///
/// # Example
///
/// ```ignore
/// use wiki_search_repository::opensearch::{IndexConfig, OpenSearchBackend};
///
/// let backend = OpenSearchBackend::new("http://localhost:9200", IndexConfig::default()).await?;
/// backend.create_index(&definition).await?;
/// ```
pub struct OpenSearchBackend {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchBackend {
    /// Create a new OpenSearch backend connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - Physical index naming and settings
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchBackend)` - A new backend instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index_prefix = %index_config.index_prefix,
            "Created OpenSearch backend"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Check that the cluster answers a ping.
    pub async fn ping(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(SearchIndexError::connection(format!(
                "Ping failed with status {}",
                response.status_code()
            )));
        }
        Ok(())
    }

    async fn error_body(response: Response) -> (u16, String) {
        let status = response.status_code().as_u16();
        let body = response.text().await.unwrap_or_default();
        (status, body)
    }

    /// Build the search request body.
    ///
    /// The query uses Lucene query-string syntax; all terms are required and field
    /// weights become `field^weight` boosts.
    fn search_body(request: &SearchRequest) -> Value {
        let fields: Vec<String> = request
            .fields
            .iter()
            .map(|f| {
                if (f.weight - 1.0).abs() < f32::EPSILON {
                    f.name.clone()
                } else {
                    format!("{}^{}", f.name, f.weight)
                }
            })
            .collect();

        let mut body = json!({
            "from": request.offset,
            "size": request.limit,
            "query": {
                "query_string": {
                    "query": request.query,
                    "fields": fields,
                    "default_operator": "AND",
                    "analyze_wildcard": true
                }
            }
        });

        if let Some(sort) = &request.sort_by {
            let order = if sort.descending { "desc" } else { "asc" };
            body["sort"] = json!([{ sort.field.as_str(): { "order": order } }, "_score"]);
        }

        if request.highlight {
            let highlighted: serde_json::Map<String, Value> = request
                .fields
                .iter()
                .map(|f| (f.name.clone(), json!({ "number_of_fragments": 0 })))
                .collect();
            body["highlight"] = json!({
                "pre_tags": [HIGHLIGHT_PRE_TAG],
                "post_tags": [HIGHLIGHT_POST_TAG],
                "fields": highlighted
            });
        }

        body["_source"] = if request.with_payloads {
            json!(true)
        } else {
            json!(["title", "route", "modified"])
        };

        body
    }

    /// Parse the hits of a search response.
    fn parse_hits(body: &Value, with_payloads: bool) -> Result<Vec<SearchHit>, SearchIndexError> {
        let hits = body["hits"]["hits"]
            .as_array()
            .ok_or_else(|| SearchIndexError::parse("search response has no hits array"))?;

        hits.iter()
            .map(|hit| {
                let key = hit["_id"]
                    .as_str()
                    .ok_or_else(|| SearchIndexError::parse("search hit has no _id"))?
                    .to_string();
                let source = &hit["_source"];
                let highlight = &hit["highlight"];

                let field = |name: &str| -> String {
                    highlight[name][0]
                        .as_str()
                        .or_else(|| source[name].as_str())
                        .unwrap_or_default()
                        .to_string()
                };

                let modified = source["modified"]
                    .as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&Utc));

                Ok(SearchHit {
                    title: field("title"),
                    content: if with_payloads {
                        field("content")
                    } else {
                        String::new()
                    },
                    route: source["route"].as_str().unwrap_or_default().to_string(),
                    modified,
                    score: hit["_score"].as_f64().unwrap_or(0.0),
                    key,
                })
            })
            .collect()
    }
}

#[async_trait]
impl FullTextBackend for OpenSearchBackend {
    async fn create_index(&self, definition: &IndexDefinition) -> Result<(), SearchIndexError> {
        let name = self.index_config.physical_name(&definition.name);

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&name))
            .body(get_index_settings(definition, self.index_config.replicas))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let (status, body) = Self::error_body(response).await;
            if status == 400 && body.contains("resource_already_exists_exception") {
                return Err(SearchIndexError::index_already_exists(&definition.name));
            }
            error!(status, body = %body, index = %name, "Create index request failed");
            return Err(SearchIndexError::index_creation(format!(
                "Create index failed with status {}: {}",
                status, body
            )));
        }

        info!(index = %name, space = %definition.name, "Created OpenSearch index");
        Ok(())
    }

    /// Delete the physical index. Its documents always go with it, so
    /// `delete_documents` has no effect.
    async fn drop_index(
        &self,
        name: &str,
        _delete_documents: bool,
    ) -> Result<(), SearchIndexError> {
        let physical = self.index_config.physical_name(name);

        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[&physical]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let (status, body) = Self::error_body(response).await;
            if status == 404 {
                return Err(SearchIndexError::index_not_found(name));
            }
            error!(status, body = %body, index = %physical, "Delete index request failed");
            return Err(SearchIndexError::response(format!(
                "Delete index failed with status {}: {}",
                status, body
            )));
        }

        debug!(index = %physical, "Deleted OpenSearch index");
        Ok(())
    }

    async fn index_exists(&self, name: &str) -> Result<bool, SearchIndexError> {
        let physical = self.index_config.physical_name(name);

        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[&physical]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchIndexError::response(format!(
                "Index exists check failed with status {}",
                status
            ))),
        }
    }

    async fn write_record(
        &self,
        index: &str,
        record: &IndexRecord,
    ) -> Result<(), SearchIndexError> {
        let physical = self.index_config.physical_name(index);
        let document =
            serde_json::to_value(record).map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        let response = self
            .client
            .index(IndexParts::IndexId(&physical, &record.key))
            .body(document)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let (status, body) = Self::error_body(response).await;
            error!(status, body = %body, key = %record.key, "Index request failed");
            return Err(SearchIndexError::response(format!(
                "Index failed with status {}: {}",
                status, body
            )));
        }

        debug!(index = %physical, key = %record.key, "Record written");
        Ok(())
    }

    async fn delete_record(&self, index: &str, key: &str) -> Result<(), SearchIndexError> {
        let physical = self.index_config.physical_name(index);

        let response = self
            .client
            .delete(DeleteParts::IndexId(&physical, key))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let (status, body) = Self::error_body(response).await;
            if status == 404 {
                return Err(if body.contains("index_not_found_exception") {
                    SearchIndexError::index_not_found(index)
                } else {
                    SearchIndexError::document_not_found(index, key)
                });
            }
            error!(status, body = %body, key = %key, "Delete request failed");
            return Err(SearchIndexError::response(format!(
                "Delete failed with status {}: {}",
                status, body
            )));
        }

        debug!(index = %physical, key = %key, "Record deleted");
        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<Vec<SearchHit>, SearchIndexError> {
        let physical = self.index_config.physical_name(index);

        let response = self
            .client
            .search(SearchParts::Index(&[&physical]))
            .body(Self::search_body(request))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let (status, body) = Self::error_body(response).await;
            if status == 404 {
                return Err(SearchIndexError::index_not_found(index));
            }
            error!(status, body = %body, index = %physical, "Search request failed");
            return Err(SearchIndexError::response(format!(
                "Search failed with status {}: {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Self::parse_hits(&body, request.with_payloads)
    }

    fn query_syntax(&self) -> QuerySyntax {
        QuerySyntax::lucene()
    }
}
