//! Path segment matching.
//!
//! # Responsibilities
//! - Split paths into trie segments
//! - Classify registration segments as literal or parameter
//! - Join group prefixes with route paths
//!
//! # Design Decisions
//! - The leading empty segment and one trailing empty segment are ignored,
//!   so `/users` and `/users/` resolve to the same node
//! - Empty segments in the middle of a path are kept (`/a//b` is three deep)
//! - Matching is case-sensitive and never crosses a `/`

use std::fmt;

/// Marker that turns a registration segment into a named parameter.
pub const PARAM_PREFIX: char = ':';

/// A registration segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches exactly this text.
    Literal(String),
    /// Matches any single segment, captured under this name.
    Param(String),
}

impl Segment {
    /// Classify one segment of a registration path.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(PARAM_PREFIX) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(raw.to_string()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Param(name) => write!(f, "{PARAM_PREFIX}{name}"),
        }
    }
}

/// Split a path into segments. The root path yields no segments.
pub fn path_segments(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').collect()
}

/// Mount `path` under `prefix`, normalizing the slash between them.
pub fn join_path(prefix: &str, path: &str) -> String {
    let mut joined = String::with_capacity(prefix.len() + path.len() + 2);
    if !prefix.starts_with('/') {
        joined.push('/');
    }
    joined.push_str(prefix);
    if !joined.ends_with('/') {
        joined.push('/');
    }
    joined.push_str(path.strip_prefix('/').unwrap_or(path));
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_ignoring_outer_slashes() {
        assert!(path_segments("/").is_empty());
        assert!(path_segments("").is_empty());
        assert_eq!(path_segments("/health"), vec!["health"]);
        assert_eq!(path_segments("/users/42/"), vec!["users", "42"]);
        assert_eq!(path_segments("/a//b"), vec!["a", "", "b"]);
    }

    #[test]
    fn classifies_segments() {
        assert_eq!(Segment::parse("users"), Segment::Literal("users".into()));
        assert_eq!(Segment::parse(":id"), Segment::Param("id".into()));
        assert_eq!(Segment::parse(":id").to_string(), ":id");
    }

    #[test]
    fn joins_group_prefixes() {
        assert_eq!(join_path("api", "/users"), "/api/users");
        assert_eq!(join_path("/api/", "users"), "/api/users");
        assert_eq!(join_path("/api", "/"), "/api/");
    }
}
