//! Document collection error types.

use thiserror::Error;

/// Errors from reading the document collection or running the fallback search.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CollectionError {
    /// Failed to read the collection source.
    #[error("Collection I/O error: {0}")]
    IoError(String),

    /// Failed to decode the collection source.
    #[error("Collection parse error: {0}")]
    ParseError(String),

    /// The collection cannot currently serve requests.
    #[error("Collection unavailable: {0}")]
    Unavailable(String),
}

impl CollectionError {
    /// Create an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
