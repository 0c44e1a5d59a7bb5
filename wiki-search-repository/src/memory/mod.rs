//! In-memory implementations of the wiki search collaborators.
//!
//! `InMemoryBackend` is a self-contained full-text engine with RediSearch-like
//! semantics: records live in a key space and each index covers the keys under its
//! prefix. The collections and the collection-backed fallback search serve local
//! development, the CLI, and tests.

mod backend;
mod collection;
mod web_search;

pub use backend::InMemoryBackend;
pub use collection::{InMemoryCollection, JsonFileCollection};
pub use web_search::CollectionWebSearch;
