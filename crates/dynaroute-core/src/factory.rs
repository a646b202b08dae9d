//! Factories: the data-access capabilities behind default handlers.
//!
//! A compiled route never talks to storage itself. Its default handler asks a
//! [`Factory`] to list, get, create, update or remove items. Factories are
//! registered by name in a [`FactoryRegistry`]; a route without a named
//! factory gets the default factory for its model id, created lazily and then
//! shared by every request of that model.

use crate::error::{RouteError, RouteResult};
use crate::request::Principal;
use crate::validation::Validator;
use crate::BoxFuture;
use dynaroute_router::Params;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The canonical factory operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactoryOperation {
    /// Return a collection.
    List,
    /// Return one item.
    Get,
    /// Create an item.
    Create,
    /// Replace or modify an item.
    Update,
    /// Delete an item.
    Remove,
}

impl FactoryOperation {
    /// Returns the method name of the operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for FactoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request data handed to a factory method.
#[derive(Debug, Clone, Copy)]
pub struct FactoryCall<'a> {
    /// Extracted path parameters.
    pub params: &'a Params,
    /// Decoded query string.
    pub query: &'a Map<String, Value>,
    /// Request body, already validated when the route validates bodies.
    pub body: &'a Value,
    /// The resolved principal.
    pub user: Option<&'a Principal>,
}

/// A data-access capability for one kind of model.
///
/// Every canonical method fails with [`RouteError::NotImplemented`] unless
/// overridden. Routes can ask for a differently named method through
/// `use_factory_method`; such calls go through [`Factory::call_custom`], and a
/// factory that does not know the name returns `None` there so the caller can
/// fall back to the canonical method.
///
/// # Example
///
/// ```
/// use dynaroute_core::{BoxFuture, Factory, FactoryCall, RouteError, RouteResult};
/// use serde_json::{json, Value};
///
/// struct Devices;
///
/// impl Factory for Devices {
///     fn get<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Value>> {
///         let id = call.params.named("id").unwrap_or_default().to_string();
///         Box::pin(async move { Ok::<_, RouteError>(json!({"id": id})) })
///     }
/// }
/// ```
pub trait Factory: Send + Sync {
    /// Returns a collection of items.
    fn list<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Vec<Value>>> {
        let _ = call;
        not_implemented(FactoryOperation::List)
    }

    /// Returns one item.
    fn get<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Value>> {
        let _ = call;
        not_implemented(FactoryOperation::Get)
    }

    /// Creates an item from the body and returns it.
    fn create<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Value>> {
        let _ = call;
        not_implemented(FactoryOperation::Create)
    }

    /// Updates the item addressed by the params and returns it.
    fn update<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Value>> {
        let _ = call;
        not_implemented(FactoryOperation::Update)
    }

    /// Removes the item addressed by the params.
    fn remove<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<()>> {
        let _ = call;
        not_implemented(FactoryOperation::Remove)
    }

    /// Calls a method by name on behalf of `operation`.
    ///
    /// Returns `None` when the factory has no method called `method`.
    fn call_custom<'a>(
        &'a self,
        method: &str,
        operation: FactoryOperation,
        call: FactoryCall<'a>,
    ) -> Option<BoxFuture<'a, RouteResult<Value>>> {
        let _ = (method, operation, call);
        None
    }
}

fn not_implemented<'a, T: Send + 'a>(operation: FactoryOperation) -> BoxFuture<'a, RouteResult<T>> {
    Box::pin(async move { Err(RouteError::not_implemented(operation.as_str())) })
}

/// The factory used when nothing else is registered.
///
/// It remembers its model id and schema and implements no operation, so every
/// default handler backed by it answers `500 NeedFunctionOverride`.
pub struct BaseFactory {
    id: String,
    schema: Option<Arc<dyn Validator>>,
}

impl BaseFactory {
    /// Creates a base factory for a model id.
    #[must_use]
    pub fn new(id: impl Into<String>, schema: Option<Arc<dyn Validator>>) -> Self {
        Self {
            id: id.into(),
            schema,
        }
    }

    /// Returns the model id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the model schema.
    #[must_use]
    pub fn schema(&self) -> Option<&Arc<dyn Validator>> {
        self.schema.as_ref()
    }
}

impl Factory for BaseFactory {}

impl fmt::Debug for BaseFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseFactory")
            .field("id", &self.id)
            .field("has_schema", &self.schema.is_some())
            .finish()
    }
}

/// Builds the default factory for a model id.
pub type FactoryBuilder =
    Arc<dyn Fn(&str, Option<&Arc<dyn Validator>>) -> Arc<dyn Factory> + Send + Sync>;

fn base_factory(id: &str, schema: Option<&Arc<dyn Validator>>) -> Arc<dyn Factory> {
    Arc::new(BaseFactory::new(id, schema.cloned()))
}

/// Named factories plus lazily created default factories.
///
/// Named factories are registered at startup. Default factories are created
/// on first use per model id by the registry's builder and then reused for
/// the registry's lifetime.
///
/// # Example
///
/// ```
/// use dynaroute_core::{BaseFactory, FactoryRegistry};
/// use std::sync::Arc;
///
/// let mut registry = FactoryRegistry::new();
/// registry.register("devices", Arc::new(BaseFactory::new("devices", None)));
/// assert!(registry.get("devices").is_some());
///
/// let a = registry.default_for("users", None);
/// let b = registry.default_for("users", None);
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct FactoryRegistry {
    named: HashMap<String, Arc<dyn Factory>>,
    defaults: RwLock<HashMap<String, Arc<dyn Factory>>>,
    builder: FactoryBuilder,
}

impl FactoryRegistry {
    /// Creates an empty registry whose default factories are [`BaseFactory`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            named: HashMap::new(),
            defaults: RwLock::new(HashMap::new()),
            builder: Arc::new(base_factory),
        }
    }

    /// Replaces the builder used for default factories.
    #[must_use]
    pub fn with_default_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(&str, Option<&Arc<dyn Validator>>) -> Arc<dyn Factory> + Send + Sync + 'static,
    {
        self.builder = Arc::new(builder);
        self
    }

    /// Registers a named factory, replacing any factory with the same name.
    pub fn register(&mut self, name: impl Into<String>, factory: Arc<dyn Factory>) {
        self.named.insert(name.into(), factory);
    }

    /// Returns the named factory.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Factory>> {
        self.named.get(name).cloned()
    }

    /// Returns true if a factory is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Returns the default factory for a model id, creating it on first use.
    pub fn default_for(&self, id: &str, schema: Option<&Arc<dyn Validator>>) -> Arc<dyn Factory> {
        if let Some(existing) = self.defaults.read().get(id) {
            return Arc::clone(existing);
        }

        let mut defaults = self.defaults.write();
        Arc::clone(
            defaults
                .entry(id.to_string())
                .or_insert_with(|| (self.builder)(id, schema)),
        )
    }

    /// Returns the number of named factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.named.len()
    }

    /// Returns true if no named factory is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FactoryRegistry")
            .field("named", &names)
            .field("default_count", &self.defaults.read().len())
            .finish_non_exhaustive()
    }
}

/// Loads the full principal for a request.
///
/// The principal stage hands it the principal derived from the session (or set
/// by an outer layer) and replaces it with the result. Failures are logged and
/// ignored.
pub trait PrincipalSource: Send + Sync {
    /// Loads the principal.
    fn load<'a>(&'a self, principal: &'a Principal) -> BoxFuture<'a, RouteResult<Principal>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn call_parts() -> (Params, Map<String, Value>, Value) {
        (Params::new(), Map::new(), Value::Null)
    }

    struct Renaming;

    impl Factory for Renaming {
        fn call_custom<'a>(
            &'a self,
            method: &str,
            _operation: FactoryOperation,
            _call: FactoryCall<'a>,
        ) -> Option<BoxFuture<'a, RouteResult<Value>>> {
            match method {
                "published" => Some(Box::pin(async { Ok::<_, RouteError>(serde_json::json!([1, 2])) })),
                _ => None,
            }
        }
    }

    #[tokio::test]
    async fn test_base_factory_methods_are_not_implemented() {
        let (params, query, body) = call_parts();
        let call = FactoryCall {
            params: &params,
            query: &query,
            body: &body,
            user: None,
        };
        let factory = BaseFactory::new("devices", None);

        let err = factory.list(call).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_body().message, "NeedFunctionOverride");

        assert!(factory.get(call).await.is_err());
        assert!(factory.create(call).await.is_err());
        assert!(factory.update(call).await.is_err());
        assert!(factory.remove(call).await.is_err());
        assert!(factory
            .call_custom("list", FactoryOperation::List, call)
            .is_none());
    }

    #[tokio::test]
    async fn test_custom_method_lookup() {
        let (params, query, body) = call_parts();
        let call = FactoryCall {
            params: &params,
            query: &query,
            body: &body,
            user: None,
        };

        let result = Renaming
            .call_custom("published", FactoryOperation::List, call)
            .unwrap()
            .await
            .unwrap();
        assert_eq!(result, serde_json::json!([1, 2]));
        assert!(Renaming
            .call_custom("archived", FactoryOperation::List, call)
            .is_none());
    }

    #[test]
    fn test_registry_named_lookup() {
        let mut registry = FactoryRegistry::new();
        assert!(registry.is_empty());

        registry.register("devices", Arc::new(BaseFactory::new("devices", None)));
        assert!(registry.contains("devices"));
        assert!(registry.get("devices").is_some());
        assert!(registry.get("users").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_default_factory_created_once_per_id() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let registry = FactoryRegistry::new().with_default_builder(move |id, schema| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(BaseFactory::new(id, schema.cloned()))
        });

        let first = registry.default_for("devices", None);
        let second = registry.default_for("devices", None);
        let other = registry.default_for("users", None);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_factory_shared_across_threads() {
        let registry = Arc::new(FactoryRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.default_for("devices", None))
            })
            .collect();

        let factories: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for factory in &factories[1..] {
            assert!(Arc::ptr_eq(&factories[0], factory));
        }
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(FactoryOperation::List.as_str(), "list");
        assert_eq!(FactoryOperation::Remove.to_string(), "remove");
    }

    #[test]
    fn test_registry_debug_lists_names() {
        let mut registry = FactoryRegistry::new();
        registry.register("b", Arc::new(BaseFactory::new("b", None)));
        registry.register("a", Arc::new(BaseFactory::new("a", None)));

        let debug = format!("{registry:?}");
        assert!(debug.contains(r#"["a", "b"]"#));
    }
}
