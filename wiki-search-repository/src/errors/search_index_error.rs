//! Search index error types.
//!
//! This module defines the unified error type for all full-text backend operations.
//! "Not found" conditions are separate variants so that idempotent operations
//! (drop, remove) can tell an already-satisfied request apart from a real fault.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `FullTextBackend` trait and `SearchIndexService` for all search index
/// operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchIndexError {
    /// Validation error (e.g., empty partition, malformed key).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish connection to the search index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The targeted index does not exist.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// An index with the same name already exists.
    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    /// The targeted document does not exist.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The backend rejected the operation.
    #[error("Backend response error: {0}")]
    ResponseError(String),

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to parse response from search index backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search index backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Unknown error.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index not found error.
    pub fn index_not_found(index: impl Into<String>) -> Self {
        Self::IndexNotFound(index.into())
    }

    /// Create an index already exists error.
    pub fn index_already_exists(index: impl Into<String>) -> Self {
        Self::IndexAlreadyExists(index.into())
    }

    /// Create a document not found error.
    pub fn document_not_found(index: &str, key: &str) -> Self {
        Self::DocumentNotFound(format!("index={}, key={}", index, key))
    }

    /// Create a backend response error.
    pub fn response(msg: impl Into<String>) -> Self {
        Self::ResponseError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create an unknown error.
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }

    /// Returns true for "index not found" and "document not found".
    ///
    /// Idempotent operations treat these as already satisfied.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::IndexNotFound(_) | Self::DocumentNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(SearchIndexError::index_not_found("docs").is_not_found());
        assert!(SearchIndexError::document_not_found("docs", "k").is_not_found());
        assert!(!SearchIndexError::response("boom").is_not_found());
        assert!(!SearchIndexError::index_already_exists("docs").is_not_found());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SearchIndexError::document_not_found("docs", "wiki:docs:p1").to_string(),
            "Document not found: index=docs, key=wiki:docs:p1"
        );
        assert_eq!(
            SearchIndexError::response("Unknown index name").to_string(),
            "Backend response error: Unknown index name"
        );
    }
}
