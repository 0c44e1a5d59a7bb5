//! OpenSearch index naming and mappings.
//!
//! Every space gets its own physical index. Space routes may contain characters
//! OpenSearch rejects in index names, so names are an escaped form of the route.

use serde_json::{json, Value};

use crate::types::IndexDefinition;

/// Default prefix for physical index names.
pub const DEFAULT_INDEX_PREFIX: &str = "wiki_search_";

/// Configuration for naming the per-space indexes.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Prepended to every physical index name.
    pub index_prefix: String,
    /// Number of replicas per index.
    pub replicas: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_prefix: DEFAULT_INDEX_PREFIX.to_string(),
            replicas: 1,
        }
    }
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `index_prefix` - Prefix for physical index names
    /// * `replicas` - Number of replicas per index
    pub fn new(index_prefix: impl Into<String>, replicas: u32) -> Self {
        Self {
            index_prefix: index_prefix.into(),
            replicas,
        }
    }

    /// Get the physical index name for a logical index (space route).
    ///
    /// Lowercase ASCII letters, digits and `-` are kept. Every other byte, `_` and
    /// uppercase letters included, is written as `_` plus two hex digits, so distinct
    /// routes never share an index.
    ///
    /// # Returns
    ///
    /// The physical index name (e.g., "wiki_search_docs_2fapi" for "docs/api")
    pub fn physical_name(&self, logical: &str) -> String {
        let mut name = self.index_prefix.to_lowercase();
        for byte in logical.bytes() {
            match byte {
                b'a'..=b'z' | b'0'..=b'9' | b'-' => name.push(byte as char),
                _ => name.push_str(&format!("_{:02x}", byte)),
            }
        }
        name
    }
}

/// Get the index settings and mappings for a space index.
///
/// - `title` / `content`: analyzed text
/// - `route`: keyword, for exact filtering
/// - `modified`: date, for sorting
///
/// Field weights are not part of the mapping; they are applied as query-time boosts.
/// The definition is kept in `_meta` so the index can be traced back to its space.
pub fn get_index_settings(definition: &IndexDefinition, replicas: u32) -> Value {
    let weights: serde_json::Map<String, Value> = definition
        .fields
        .iter()
        .map(|f| (f.name.clone(), json!(f.weight)))
        .collect();

    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": replicas
        },
        "mappings": {
            "_meta": {
                "space": definition.name,
                "key_prefix": definition.key_prefix,
                "weights": weights
            },
            "properties": {
                "title": { "type": "text" },
                "content": { "type": "text" },
                "route": { "type": "keyword" },
                "modified": { "type": "date" }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextField;

    #[test]
    fn test_physical_name() {
        let config = IndexConfig::default();
        assert_eq!(config.physical_name("docs"), "wiki_search_docs");
        assert_eq!(config.physical_name("docs/api"), "wiki_search_docs_2fapi");
        assert_eq!(config.physical_name("team wiki"), "wiki_search_team_20wiki");
        assert_eq!(config.physical_name("Docs"), "wiki_search__44ocs");
    }

    #[test]
    fn test_physical_names_do_not_collide() {
        let config = IndexConfig::default();
        let routes = ["docs/api", "docs_api", "Docs/Api", "docs.api", "docs_2fapi", "/docs/api"];

        let names: std::collections::HashSet<String> =
            routes.iter().map(|r| config.physical_name(r)).collect();

        assert_eq!(names.len(), routes.len());
    }

    #[test]
    fn test_physical_name_lowercases_prefix() {
        let config = IndexConfig::new("Wiki-", 0);
        assert_eq!(config.physical_name("docs"), "wiki-docs");
    }

    #[test]
    fn test_index_settings_structure() {
        let definition = IndexDefinition::new("docs", "wiki_page_search_docdocs:")
            .text(TextField::weighted("title", 3.0))
            .text(TextField::new("content"));
        let settings = get_index_settings(&definition, 1);

        assert_eq!(settings["settings"]["number_of_replicas"], 1);
        assert_eq!(settings["mappings"]["properties"]["title"]["type"], "text");
        assert_eq!(settings["mappings"]["properties"]["route"]["type"], "keyword");
        assert_eq!(settings["mappings"]["properties"]["modified"]["type"], "date");
        assert_eq!(
            settings["mappings"]["_meta"]["key_prefix"],
            "wiki_page_search_docdocs:"
        );
        assert_eq!(settings["mappings"]["_meta"]["weights"]["title"], 3.0);
    }
}
