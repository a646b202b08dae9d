//! Route patterns and path joining.

use crate::params::{Params, PLACEHOLDER_MARKER};

/// A request path that does not fit a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathMismatch {
    /// The route pattern is empty but the request path is not.
    #[error("route pattern is empty")]
    EmptyPattern,

    /// The request path has a different number of segments.
    #[error("expected {expected} path segments, got {actual}")]
    SegmentCount {
        /// Segment count of the pattern.
        expected: usize,
        /// Segment count of the request path.
        actual: usize,
    },

    /// A literal segment differs from the request segment at the same position.
    #[error("segment {position} does not match: expected '{expected}', got '{actual}'")]
    Literal {
        /// Zero-based segment index.
        position: usize,
        /// Literal from the pattern.
        expected: String,
        /// Segment from the request path.
        actual: String,
    },
}

/// A compiled route path such as `/v1/devices/:id`.
///
/// Segments starting with `:` are placeholders and match any single request
/// segment; all other segments must match byte for byte.
///
/// # Example
///
/// ```rust
/// use dynaroute_router::RoutePattern;
///
/// let pattern = RoutePattern::new("/v1/devices/:id");
/// let params = pattern.extract_params("/v1/devices/42").unwrap();
/// assert_eq!(params.get(":id"), Some("42"));
///
/// assert!(pattern.extract_params("/v1/devices").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    placeholders: usize,
}

impl RoutePattern {
    /// Creates a pattern from its string form. Placeholders are kept verbatim.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let placeholders = raw.split('/').filter(|s| is_placeholder(s)).count();
        Self { raw, placeholders }
    }

    /// Returns the pattern string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the number of placeholder segments.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.placeholders
    }

    /// Matches `request_path` and extracts placeholder values.
    ///
    /// Values are keyed by the placeholder token including its `:` marker.
    /// A pattern equal to the request path yields no parameters, even when it
    /// contains placeholders.
    pub fn extract_params(&self, request_path: &str) -> Result<Params, PathMismatch> {
        if self.raw == request_path {
            return Ok(Params::new());
        }
        if self.raw.is_empty() {
            return Err(PathMismatch::EmptyPattern);
        }

        let expected = self.raw.split('/').count();
        let actual = request_path.split('/').count();
        if expected != actual {
            return Err(PathMismatch::SegmentCount { expected, actual });
        }

        let mut params = Params::with_capacity(self.placeholders);
        for (position, (pattern_seg, request_seg)) in
            self.raw.split('/').zip(request_path.split('/')).enumerate()
        {
            if is_placeholder(pattern_seg) {
                params.push(pattern_seg, request_seg);
            } else if pattern_seg != request_seg {
                return Err(PathMismatch::Literal {
                    position,
                    expected: pattern_seg.to_string(),
                    actual: request_seg.to_string(),
                });
            }
        }

        Ok(params)
    }

    /// Returns true if `request_path` fits this pattern.
    #[must_use]
    pub fn matches(&self, request_path: &str) -> bool {
        self.extract_params(request_path).is_ok()
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for RoutePattern {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn is_placeholder(segment: &str) -> bool {
    segment.starts_with(PLACEHOLDER_MARKER)
}

/// Joins a base path and a suffix segment-wise.
///
/// Empty and `.` segments are dropped, `..` removes the previous segment,
/// placeholder segments are untouched, and the result keeps a leading slash
/// when `base` has one. The result never ends with a slash, and joining two
/// empty paths gives an empty path rather than `.`, so a trailing slash on a
/// schema path does not change which requests its routes match.
///
/// ```rust
/// use dynaroute_router::join_paths;
///
/// assert_eq!(join_paths("/v1/devices", ":id"), "/v1/devices/:id");
/// assert_eq!(join_paths("/v1/devices/", "./"), "/v1/devices");
/// assert_eq!(join_paths("", "items"), "items");
/// assert_eq!(join_paths("", ""), "");
/// ```
#[must_use]
pub fn join_paths(base: &str, suffix: &str) -> String {
    let absolute = base.starts_with('/') || (base.is_empty() && suffix.starts_with('/'));
    let mut segments: Vec<&str> = Vec::new();

    for segment in base.split('/').chain(suffix.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}
