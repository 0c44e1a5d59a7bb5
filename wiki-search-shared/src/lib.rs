//! # Wiki Search Shared
//!
//! This crate defines shared data structures and types used across the wiki search
//! ecosystem: documents and their indexed projection, search results, partition
//! ("space") routing rules and markup stripping.

pub mod markup;
pub mod partition;
pub mod types;

pub use markup::strip_html_tags;
pub use partition::{belongs_to_partition, is_version_segment, resolve_partition, PartitionSet};
pub use types::document::{DocumentRef, IndexRecord, WikiDocument};
pub use types::search_result::{FallbackHit, ResultDoc, SearchEngine, SearchHit, SearchResponse};
