//! Partition ("space") routing rules.
//!
//! Every space owns one full-text index. A document belongs to the space whose route
//! is the longest segment-wise prefix of the document's route. Versioned sub-trees
//! (`<space>/v2/...`) are not indexed under the space.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref VERSION_SEGMENT_REGEXP: Regex = Regex::new(r"^v\d+(\.\d+)*$").unwrap();
}

fn normalize_route(route: &str) -> &str {
    route.trim_matches('/')
}

/// Returns the remainder of `route` below `partition`, or `None` if `route` is not
/// under `partition`. A route equal to the partition yields `Some("")`.
fn route_below<'a>(partition: &str, route: &'a str) -> Option<&'a str> {
    let partition = normalize_route(partition);
    let route = normalize_route(route);

    if partition.is_empty() {
        return None;
    }
    if route == partition {
        return Some("");
    }
    route.strip_prefix(partition)?.strip_prefix('/')
}

/// Check whether a route segment is a version marker such as `v2` or `v1.4`.
pub fn is_version_segment(segment: &str) -> bool {
    VERSION_SEGMENT_REGEXP.is_match(segment)
}

/// Check whether a document at `route` is indexed under `partition`.
///
/// The route must equal the partition route or lie below it, and the first segment
/// below the partition must not be a version marker.
///
/// # Example
///
/// ```
/// use wiki_search_shared::belongs_to_partition;
///
/// assert!(belongs_to_partition("docs", "docs/intro"));
/// assert!(!belongs_to_partition("docs", "docs/v2/intro"));
/// assert!(!belongs_to_partition("docs", "documents/intro"));
/// ```
pub fn belongs_to_partition(partition: &str, route: &str) -> bool {
    match route_below(partition, route) {
        Some(rest) => rest
            .split('/')
            .next()
            .map_or(true, |first| !is_version_segment(first)),
        None => false,
    }
}

/// Resolve the partition a path belongs to by longest-prefix match.
///
/// Returns `None` when no known partition route is a prefix of `path`.
pub fn resolve_partition<'a>(partitions: &'a [String], path: &str) -> Option<&'a str> {
    partitions
        .iter()
        .filter(|partition| route_below(partition, path).is_some())
        .max_by_key(|partition| normalize_route(partition).len())
        .map(String::as_str)
}

/// A set of known partition routes, ordered longest first for prefix resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionSet {
    routes: Vec<String>,
}

impl PartitionSet {
    /// Build a partition set. Blank routes are ignored and duplicates collapse.
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut routes: Vec<String> = routes
            .into_iter()
            .map(Into::into)
            .filter(|route| !normalize_route(route).is_empty())
            .collect();
        routes.sort_by(|a, b| {
            normalize_route(b)
                .len()
                .cmp(&normalize_route(a).len())
                .then_with(|| a.cmp(b))
        });
        routes.dedup();
        Self { routes }
    }

    /// The longest known partition route that is a prefix of `path`.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|partition| route_below(partition, path).is_some())
            .map(String::as_str)
    }

    /// Check whether `partition` owns the document at `route`: it must be the
    /// document's resolved partition and the route must not be versioned.
    pub fn owns(&self, partition: &str, route: &str) -> bool {
        self.resolve(route) == Some(partition) && belongs_to_partition(partition, route)
    }

    pub fn routes(&self) -> &[String] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
