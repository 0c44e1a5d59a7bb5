//! Utility functions for the wiki search repository.

/// Characters kept by [`clean_query`] besides alphanumerics and whitespace.
const QUERY_SAFE_PUNCTUATION: [char; 2] = ['*', '_'];

/// Build the key prefix covered by a space's index: `<key_prefix><partition>:`.
///
/// # Example
///
/// ```
/// use wiki_search_repository::utils::index_key_prefix;
///
/// assert_eq!(index_key_prefix("wiki_page_search_doc", "docs"), "wiki_page_search_docdocs:");
/// ```
pub fn index_key_prefix(key_prefix: &str, partition: &str) -> String {
    format!("{}{}:", key_prefix, partition)
}

/// Build the storage key of a document: `<key_prefix><partition>:<id>`.
pub fn record_key(key_prefix: &str, partition: &str, id: &str) -> String {
    format!("{}{}", index_key_prefix(key_prefix, partition), id)
}

/// Recover the document id from a record key.
///
/// Strips the index key prefix when it matches; otherwise falls back to everything
/// after the first `:`.
pub fn document_id_from_key<'a>(key: &'a str, index_prefix: &str) -> &'a str {
    key.strip_prefix(index_prefix)
        .or_else(|| key.split_once(':').map(|(_, id)| id))
        .unwrap_or(key)
}

/// Remove characters that are operators in full-text query languages.
///
/// Alphanumerics, whitespace, `_` and the `*` wildcard are kept; everything else is
/// replaced by a space so that punctuation separates terms.
pub fn clean_query(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || QUERY_SAFE_PUNCTUATION.contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key() {
        assert_eq!(
            record_key("wiki_page_search_doc", "docs", "p1"),
            "wiki_page_search_docdocs:p1"
        );
    }

    #[test]
    fn test_document_id_from_key() {
        let prefix = index_key_prefix("wiki_page_search_doc", "docs/api");
        let key = record_key("wiki_page_search_doc", "docs/api", "auth:tokens");

        assert_eq!(document_id_from_key(&key, &prefix), "auth:tokens");
        assert_eq!(document_id_from_key("other:p1", &prefix), "p1");
        assert_eq!(document_id_from_key("bare", &prefix), "bare");
    }

    #[test]
    fn test_clean_query() {
        assert_eq!(clean_query("hello"), "hello");
        assert_eq!(clean_query("hello*"), "hello*");
        assert_eq!(clean_query("@title:(foo) | bar"), "title  foo    bar");
        assert_eq!(clean_query("%%fuzzy%%"), "fuzzy");
        assert_eq!(clean_query("  "), "");
        assert_eq!(clean_query("snake_case"), "snake_case");
    }
}
