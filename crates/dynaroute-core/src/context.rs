//! Per-request context.
//!
//! The [`RequestContext`] travels with a [`Request`](crate::Request) through
//! every step of a compiled route. Steps use it to hand results to later steps:
//! the factory loader stores the resolved factory, the default handlers store
//! the raw factory result for post handlers, and custom steps can park typed
//! values in the extension map.

use crate::factory::Factory;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, so request ids sort by arrival in logs.
///
/// # Example
///
/// ```
/// use dynaroute_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// State shared between the steps of one request.
pub struct RequestContext {
    request_id: RequestId,
    started_at: Instant,
    factory: Option<Arc<dyn Factory>>,
    response_object: Option<serde_json::Value>,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Creates an empty context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates an empty context with the given request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            started_at: Instant::now(),
            factory: None,
            response_object: None,
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Returns the factory loaded for this request, if any.
    #[must_use]
    pub fn factory(&self) -> Option<Arc<dyn Factory>> {
        self.factory.clone()
    }

    /// Stores the factory used by later steps.
    pub fn set_factory(&mut self, factory: Arc<dyn Factory>) {
        self.factory = Some(factory);
    }

    /// Returns the raw factory result of the default handler.
    #[must_use]
    pub fn response_object(&self) -> Option<&serde_json::Value> {
        self.response_object.as_ref()
    }

    /// Records the raw factory result so post handlers can inspect it.
    pub fn set_response_object(&mut self, value: serde_json::Value) {
        self.response_object = Some(value);
    }

    /// Stores a typed extension value, replacing any previous value of that type.
    ///
    /// # Example
    ///
    /// ```
    /// use dynaroute_core::RequestContext;
    ///
    /// struct Tenant(&'static str);
    ///
    /// let mut ctx = RequestContext::new();
    /// ctx.set_extension(Tenant("acme"));
    /// assert_eq!(ctx.get_extension::<Tenant>().map(|t| t.0), Some("acme"));
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Removes and returns a typed extension value.
    pub fn take_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("has_factory", &self.factory.is_some())
            .field("response_object", &self.response_object)
            .field("extension_count", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::BaseFactory;

    #[test]
    fn test_request_id_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_context_starts_empty() {
        let ctx = RequestContext::new();
        assert!(ctx.factory().is_none());
        assert!(ctx.response_object().is_none());
        assert!(ctx.get_extension::<u32>().is_none());
    }

    #[test]
    fn test_factory_slot() {
        let mut ctx = RequestContext::new();
        let factory: Arc<dyn Factory> = Arc::new(BaseFactory::new("devices", None));
        ctx.set_factory(Arc::clone(&factory));

        let stored = ctx.factory().unwrap();
        assert!(Arc::ptr_eq(&stored, &factory));
    }

    #[test]
    fn test_response_object() {
        let mut ctx = RequestContext::new();
        ctx.set_response_object(serde_json::json!({"id": "42"}));
        assert_eq!(ctx.response_object().unwrap()["id"], "42");
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, PartialEq)]
        struct Marker(u8);

        let mut ctx = RequestContext::new();
        ctx.set_extension(Marker(1));
        ctx.set_extension(Marker(2));
        assert_eq!(ctx.get_extension::<Marker>(), Some(&Marker(2)));

        assert_eq!(ctx.take_extension::<Marker>(), Some(Marker(2)));
        assert!(ctx.get_extension::<Marker>().is_none());
    }

    #[test]
    fn test_debug_hides_extensions() {
        let mut ctx = RequestContext::new();
        ctx.set_extension(7u32);
        let debug = format!("{ctx:?}");
        assert!(debug.contains("extension_count: 1"));
    }
}
