//! Path parameter storage.
//!
//! Extracted parameters are kept as ordered (key, value) pairs using a
//! small-vector so the common case (one or two placeholders) never touches
//! the heap.

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Marker that introduces a placeholder segment in a route pattern.
pub const PLACEHOLDER_MARKER: char = ':';

/// Path parameters extracted from a request path.
///
/// Keys are the placeholder tokens exactly as they appear in the route
/// pattern, marker included: the pattern `/devices/:id` yields the key `":id"`.
/// [`Params::named`] looks a parameter up by its bare name instead.
///
/// # Example
///
/// ```rust
/// use dynaroute_router::Params;
///
/// let mut params = Params::new();
/// params.push(":id", "42");
///
/// assert_eq!(params.get(":id"), Some("42"));
/// assert_eq!(params.named("id"), Some("42"));
/// assert_eq!(params.get("id"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a params set with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Adds a parameter to the set.
    ///
    /// A later push with the same key shadows the earlier one for lookups.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.push((key.into(), value.into()));
    }

    /// Returns the value stored under the exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of the placeholder `name`, ignoring the marker.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .rev()
            .find(|(k, _)| k.strip_prefix(PLACEHOLDER_MARKER) == Some(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Clears all parameters, retaining allocated capacity.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
