//! Schema and route definitions.
//!
//! A [`SchemaDefinition`] describes the HTTP surface of one resource: its id,
//! model validator, default factory, base path and a map of routes. Each
//! route is a [`RouteEntry`]: a full [`RouteDefinition`], a bare path, or
//! nothing at all (the route id then doubles as its operation kind).

use dynaroute_core::Validator;
use dynaroute_pipeline::BoxedStep;
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A middleware attached to a schema or a route.
#[derive(Clone)]
pub enum MiddlewareRef {
    /// A step given directly.
    Step(BoxedStep),
    /// A handler looked up in the handler registry at compile time.
    Named(String),
}

impl MiddlewareRef {
    /// Returns the step name or the registry name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Step(step) => step.name(),
            Self::Named(name) => name,
        }
    }
}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step(step) => f.debug_tuple("Step").field(&step.name()).finish(),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

impl From<BoxedStep> for MiddlewareRef {
    fn from(step: BoxedStep) -> Self {
        Self::Step(step)
    }
}

/// Per-route settings.
///
/// Every field is optional. Unset fields fall back to the schema's settings
/// or to the built-in defaults when the route is compiled.
#[derive(Clone, Default)]
pub struct RouteDefinition {
    /// Overrides the schema id for this route.
    pub id: Option<String>,
    /// Operation kind (`list`, `get`, `put`, `post`, `delete`). Defaults to
    /// the route id.
    pub method: Option<String>,
    /// Path appended to the schema's base path.
    pub path: Option<String>,
    /// Validator for the request headers.
    pub header_validation: Option<Arc<dyn Validator>>,
    /// Validator for the request body.
    pub validation: Option<Arc<dyn Validator>>,
    /// Handler run after the factory is loaded.
    pub post_validation: Option<String>,
    /// Handler that replaces the default factory loader.
    pub load_factory: Option<String>,
    /// Handler that replaces the default operation handler.
    pub handler: Option<String>,
    /// Handler run after the main handler.
    pub post_handler: Option<String>,
    /// Factory name, overriding the schema's.
    pub use_factory: Option<String>,
    /// Factory method called instead of the canonical one.
    pub use_factory_method: Option<String>,
    /// Middlewares run after the schema's middlewares.
    pub middlewares: Vec<MiddlewareRef>,
}

impl RouteDefinition {
    /// Creates a route with no settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a route with only an operation kind.
    #[must_use]
    pub fn for_method(method: impl Into<String>) -> Self {
        Self::new().with_method(method)
    }

    /// Creates a route with only a path.
    #[must_use]
    pub fn for_path(path: impl Into<String>) -> Self {
        Self::new().with_path(path)
    }

    /// Sets the id override.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the operation kind.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the path suffix.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the header validator.
    pub fn with_header_validation(mut self, validator: Arc<dyn Validator>) -> Self {
        self.header_validation = Some(validator);
        self
    }

    /// Sets the body validator.
    pub fn with_validation(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validation = Some(validator);
        self
    }

    /// Names the post-validation handler.
    pub fn with_post_validation(mut self, name: impl Into<String>) -> Self {
        self.post_validation = Some(name.into());
        self
    }

    /// Names the factory loader handler.
    pub fn with_load_factory(mut self, name: impl Into<String>) -> Self {
        self.load_factory = Some(name.into());
        self
    }

    /// Names the main handler.
    pub fn with_handler(mut self, name: impl Into<String>) -> Self {
        self.handler = Some(name.into());
        self
    }

    /// Names the post handler.
    pub fn with_post_handler(mut self, name: impl Into<String>) -> Self {
        self.post_handler = Some(name.into());
        self
    }

    /// Sets the factory name.
    pub fn with_factory(mut self, name: impl Into<String>) -> Self {
        self.use_factory = Some(name.into());
        self
    }

    /// Sets the factory method.
    pub fn with_factory_method(mut self, method: impl Into<String>) -> Self {
        self.use_factory_method = Some(method.into());
        self
    }

    /// Appends a middleware.
    pub fn with_middleware(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.middlewares.push(middleware.into());
        self
    }

    /// Appends a middleware resolved by name.
    pub fn with_named_middleware(mut self, name: impl Into<String>) -> Self {
        self.middlewares.push(MiddlewareRef::Named(name.into()));
        self
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("has_header_validation", &self.header_validation.is_some())
            .field("has_validation", &self.validation.is_some())
            .field("post_validation", &self.post_validation)
            .field("load_factory", &self.load_factory)
            .field("handler", &self.handler)
            .field("post_handler", &self.post_handler)
            .field("use_factory", &self.use_factory)
            .field("use_factory_method", &self.use_factory_method)
            .field("middlewares", &self.middlewares)
            .finish()
    }
}

/// A value of the schema's route map.
#[derive(Debug, Clone)]
pub enum RouteEntry {
    /// Full route settings.
    Route(RouteDefinition),
    /// A route whose only setting is its path.
    Path(String),
    /// A route with no settings.
    Empty,
}

impl RouteEntry {
    /// Returns the entry as route settings.
    #[must_use]
    pub fn definition(&self) -> Cow<'_, RouteDefinition> {
        match self {
            Self::Route(route) => Cow::Borrowed(route),
            Self::Path(path) if path.is_empty() => Cow::Owned(RouteDefinition::new()),
            Self::Path(path) => Cow::Owned(RouteDefinition::for_path(path.clone())),
            Self::Empty => Cow::Owned(RouteDefinition::new()),
        }
    }
}

impl From<RouteDefinition> for RouteEntry {
    fn from(route: RouteDefinition) -> Self {
        Self::Route(route)
    }
}

impl From<&str> for RouteEntry {
    fn from(path: &str) -> Self {
        if path.is_empty() {
            Self::Empty
        } else {
            Self::Path(path.to_string())
        }
    }
}

/// The HTTP surface of one resource.
#[derive(Clone, Default)]
pub struct SchemaDefinition {
    /// Resource id, used as the default model id of every route.
    pub id: Option<String>,
    /// Validator for the resource's model.
    pub model_schema: Option<Arc<dyn Validator>>,
    /// Default factory name for every route.
    pub use_factory: Option<String>,
    /// Default factory loader handler for every route.
    pub load_factory: Option<String>,
    /// Base path of every route.
    pub path: Option<String>,
    /// Routes by id, in declaration order.
    pub routes: IndexMap<String, RouteEntry>,
    /// Middlewares run first on every route.
    pub middlewares: Vec<MiddlewareRef>,
}

impl SchemaDefinition {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> SchemaDefinitionBuilder {
        SchemaDefinitionBuilder::default()
    }

    /// Returns the route ids in declaration order.
    pub fn route_ids(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Returns the entry of a route.
    #[must_use]
    pub fn route(&self, route_id: &str) -> Option<&RouteEntry> {
        self.routes.get(route_id)
    }
}

impl fmt::Debug for SchemaDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDefinition")
            .field("id", &self.id)
            .field("has_model_schema", &self.model_schema.is_some())
            .field("use_factory", &self.use_factory)
            .field("load_factory", &self.load_factory)
            .field("path", &self.path)
            .field("routes", &self.routes)
            .field("middlewares", &self.middlewares)
            .finish()
    }
}

/// Builder for [`SchemaDefinition`].
///
/// # Example
///
/// ```
/// use dynaroute_schema::{RouteDefinition, SchemaDefinition};
///
/// let schema = SchemaDefinition::builder()
///     .id("devices")
///     .path("/v1/devices")
///     .route("list", RouteDefinition::new())
///     .route("get", RouteDefinition::for_path(":id"))
///     .build();
///
/// assert_eq!(schema.route_ids().collect::<Vec<_>>(), vec!["list", "get"]);
/// ```
#[derive(Debug, Default)]
pub struct SchemaDefinitionBuilder {
    schema: SchemaDefinition,
}

impl SchemaDefinitionBuilder {
    /// Sets the id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.schema.id = Some(id.into());
        self
    }

    /// Sets the model validator.
    #[must_use]
    pub fn model_schema(mut self, validator: Arc<dyn Validator>) -> Self {
        self.schema.model_schema = Some(validator);
        self
    }

    /// Sets the default factory name.
    #[must_use]
    pub fn use_factory(mut self, name: impl Into<String>) -> Self {
        self.schema.use_factory = Some(name.into());
        self
    }

    /// Sets the default factory loader handler.
    #[must_use]
    pub fn load_factory(mut self, name: impl Into<String>) -> Self {
        self.schema.load_factory = Some(name.into());
        self
    }

    /// Sets the base path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.schema.path = Some(path.into());
        self
    }

    /// Adds or replaces a route.
    #[must_use]
    pub fn route(mut self, route_id: impl Into<String>, entry: impl Into<RouteEntry>) -> Self {
        self.schema.routes.insert(route_id.into(), entry.into());
        self
    }

    /// Adds a route with no settings.
    #[must_use]
    pub fn empty_route(self, route_id: impl Into<String>) -> Self {
        self.route(route_id, RouteEntry::Empty)
    }

    /// Appends a middleware.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.schema.middlewares.push(middleware.into());
        self
    }

    /// Appends a middleware resolved by name.
    #[must_use]
    pub fn named_middleware(mut self, name: impl Into<String>) -> Self {
        self.schema
            .middlewares
            .push(MiddlewareRef::Named(name.into()));
        self
    }

    /// Builds the schema.
    #[must_use]
    pub fn build(self) -> SchemaDefinition {
        self.schema
    }
}

/// Named schemas, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: IndexMap<String, SchemaDefinition>,
}

impl SchemaCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a schema.
    pub fn insert(&mut self, schema_id: impl Into<String>, schema: SchemaDefinition) {
        self.schemas.insert(schema_id.into(), schema);
    }

    /// Adds a schema, consuming and returning the catalog.
    #[must_use]
    pub fn with(mut self, schema_id: impl Into<String>, schema: SchemaDefinition) -> Self {
        self.insert(schema_id, schema);
        self
    }

    /// Returns a schema by id.
    #[must_use]
    pub fn get(&self, schema_id: &str) -> Option<&SchemaDefinition> {
        self.schemas.get(schema_id)
    }

    /// Returns true if the catalog holds `schema_id`.
    #[must_use]
    pub fn contains(&self, schema_id: &str) -> bool {
        self.schemas.contains_key(schema_id)
    }

    /// Returns the schema ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Iterates over `(schema_id, schema)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaDefinition)> {
        self.schemas.iter().map(|(id, schema)| (id.as_str(), schema))
    }

    /// Returns the number of schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl FromIterator<(String, SchemaDefinition)> for SchemaCatalog {
    fn from_iter<I: IntoIterator<Item = (String, SchemaDefinition)>>(iter: I) -> Self {
        Self {
            schemas: iter.into_iter().collect(),
        }
    }
}

/// What a route is compiled from: one schema, or a catalog of named schemas.
#[derive(Debug, Clone, Copy)]
pub enum SchemaSource<'a> {
    /// A schema used as-is.
    Single(&'a SchemaDefinition),
    /// A catalog, indexed by the schema id at compile time.
    Catalog(&'a SchemaCatalog),
}

impl<'a> From<&'a SchemaDefinition> for SchemaSource<'a> {
    fn from(schema: &'a SchemaDefinition) -> Self {
        Self::Single(schema)
    }
}

impl<'a> From<&'a SchemaCatalog> for SchemaSource<'a> {
    fn from(catalog: &'a SchemaCatalog) -> Self {
        Self::Catalog(catalog)
    }
}
