//! Flattening a schema route into a pipeline.
//!
//! [`SchemaCompiler::compile`] merges the schema-level and route-level
//! settings of one route and lays its steps out in a fixed order:
//!
//! 1. Schema middlewares, then route middlewares
//! 2. Header validation (if the route validates headers)
//! 3. Body validation (if the route validates its body)
//! 4. Load principal
//! 5. Load factory (custom handler or the default loader)
//! 6. Post-validation handler (if resolved)
//! 7. Main handler (custom handler or the default for the operation kind)
//! 8. Post handler (if resolved)
//!
//! Handler names are resolved once, here. A name the registry does not know
//! is treated as absent.

use crate::compiled::CompiledRoute;
use crate::definition::{MiddlewareRef, RouteDefinition, SchemaDefinition, SchemaSource};
use crate::error::{CompileError, CompileResult};
use crate::shape::validate_schema;
use dynaroute_core::Services;
use dynaroute_pipeline::steps::{
    DefaultHandler, LoadFactory, LoadPrincipal, ValidateBody, ValidateHeaders,
};
use dynaroute_pipeline::{
    BindContext, BoundStep, BoxedStep, HandlerRegistry, OperationKind, Pipeline, RouteHandler,
};
use dynaroute_router::{join_paths, RoutePattern};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Compiles schema routes against a handler registry and a set of services.
///
/// # Example
///
/// ```
/// use dynaroute_schema::{RouteDefinition, SchemaCompiler, SchemaDefinition};
///
/// let schema = SchemaDefinition::builder()
///     .id("devices")
///     .path("/v1/devices")
///     .route("get", ":id")
///     .build();
///
/// let route = SchemaCompiler::default().compile(&schema, "devices", "get").unwrap();
/// assert_eq!(route.http_method(), "GET");
/// assert_eq!(route.http_route(), "/v1/devices/:id");
/// assert_eq!(route.step_names(), vec!["load_principal", "load_factory", "default_get"]);
/// ```
#[derive(Clone, Default)]
pub struct SchemaCompiler {
    handlers: Arc<HandlerRegistry>,
    services: Arc<Services>,
    default_handlers: HashMap<OperationKind, Arc<dyn RouteHandler>>,
}

impl SchemaCompiler {
    /// Creates a compiler.
    pub fn new(handlers: Arc<HandlerRegistry>, services: Arc<Services>) -> Self {
        Self {
            handlers,
            services,
            default_handlers: HashMap::new(),
        }
    }

    /// Replaces the built-in default handler of one operation kind.
    #[must_use]
    pub fn with_default_handler(
        mut self,
        kind: OperationKind,
        handler: Arc<dyn RouteHandler>,
    ) -> Self {
        self.default_handlers.insert(kind, handler);
        self
    }

    /// Returns the handler registry.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Returns the services routes are compiled against.
    #[must_use]
    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Compiles one route.
    ///
    /// With a [`SchemaSource::Catalog`], `schema_id` selects the schema.
    /// With a single schema, `schema_id` is only the fallback model id.
    pub fn compile<'a>(
        &self,
        source: impl Into<SchemaSource<'a>>,
        schema_id: &str,
        route_id: &str,
    ) -> CompileResult<CompiledRoute> {
        let schema = match source.into() {
            SchemaSource::Single(schema) => schema,
            SchemaSource::Catalog(catalog) => {
                catalog
                    .get(schema_id)
                    .ok_or_else(|| CompileError::UnknownSchema {
                        schema: schema_id.to_string(),
                    })?
            }
        };
        validate_schema(schema)?;

        let entry = schema
            .route(route_id)
            .ok_or_else(|| CompileError::UnknownRoute {
                schema: schema_id.to_string(),
                route: route_id.to_string(),
            })?;
        let route = entry.definition();

        self.flatten(schema, &route, schema_id, route_id)
    }

    /// Compiles every route of a schema, in declaration order.
    pub fn compile_all<'a>(
        &self,
        source: impl Into<SchemaSource<'a>>,
        schema_id: &str,
    ) -> CompileResult<Vec<CompiledRoute>> {
        let source = source.into();
        let schema = match source {
            SchemaSource::Single(schema) => schema,
            SchemaSource::Catalog(catalog) => {
                catalog
                    .get(schema_id)
                    .ok_or_else(|| CompileError::UnknownSchema {
                        schema: schema_id.to_string(),
                    })?
            }
        };

        schema
            .route_ids()
            .map(|route_id| self.compile(source, schema_id, route_id))
            .collect()
    }

    fn flatten(
        &self,
        schema: &SchemaDefinition,
        route: &RouteDefinition,
        schema_id: &str,
        route_id: &str,
    ) -> CompileResult<CompiledRoute> {
        let id = route
            .id
            .as_deref()
            .or(schema.id.as_deref())
            .unwrap_or(schema_id)
            .to_string();
        let handler_method = route.method.as_deref().unwrap_or(route_id);
        let kind = OperationKind::parse(handler_method).ok_or_else(|| {
            CompileError::InvalidOperationKind {
                kind: handler_method.to_string(),
            }
        })?;
        let http_method = kind.http_method();
        let http_route = join_paths(
            schema.path.as_deref().unwrap_or_default(),
            route.path.as_deref().unwrap_or_default(),
        );

        let factory_name = route.use_factory.as_ref().or(schema.use_factory.as_ref());
        let factory_loader = route.load_factory.as_ref().or(schema.load_factory.as_ref());
        let load_factory = self.resolve(factory_loader);
        let post_validation = self.resolve(route.post_validation.as_ref());
        let handler = self.resolve(route.handler.as_ref());
        let post_handler = self.resolve(route.post_handler.as_ref());

        let bind = Arc::new(
            BindContext::new(id.clone(), Arc::clone(&self.services))
                .with_model_schema(schema.model_schema.clone())
                .with_factory_name(factory_name.cloned())
                .with_factory_method(route.use_factory_method.clone()),
        );

        info!(
            schema_id,
            id = %id,
            handler_method,
            http_method = %http_method,
            http_route = %http_route,
            using_factory = factory_name.map(String::as_str),
            has_factory_loader = factory_loader.map(String::as_str),
            has_validation = route.validation.is_some(),
            has_header_validation = route.header_validation.is_some(),
            has_post_validation_handler = route.post_validation.as_deref(),
            has_route_handler = route.handler.as_deref(),
            has_post_route_handler = route.post_handler.as_deref(),
            num_middlewares = route.middlewares.len(),
            "Handling route"
        );

        let main: BoxedStep = match handler {
            Some(handler) => Arc::new(BoundStep::new("handler", handler, Arc::clone(&bind))),
            None => match self.default_handlers.get(&kind) {
                Some(handler) => Arc::new(BoundStep::new(
                    format!("default_{kind}"),
                    Arc::clone(handler),
                    Arc::clone(&bind),
                )),
                None => Arc::new(DefaultHandler::new(kind, Arc::clone(&bind))),
            },
        };
        let load_factory: BoxedStep = match load_factory {
            Some(handler) => Arc::new(BoundStep::new("load_factory", handler, Arc::clone(&bind))),
            None => Arc::new(LoadFactory::new(Arc::clone(&bind))),
        };

        let pipeline = Pipeline::builder(http_route.clone())
            .steps(self.middlewares(&schema.middlewares, &bind))
            .steps(self.middlewares(&route.middlewares, &bind))
            .optional_step(
                route
                    .header_validation
                    .clone()
                    .map(|v| Arc::new(ValidateHeaders::new(v)) as BoxedStep),
            )
            .optional_step(
                route
                    .validation
                    .clone()
                    .map(|v| Arc::new(ValidateBody::new(v)) as BoxedStep),
            )
            .step(Arc::new(LoadPrincipal::new(
                self.services.principal_source().cloned(),
            )))
            .step(load_factory)
            .optional_step(post_validation.map(|h| {
                Arc::new(BoundStep::new("post_validation", h, Arc::clone(&bind))) as BoxedStep
            }))
            .step(main)
            .optional_step(post_handler.map(|h| {
                Arc::new(BoundStep::new("post_handler", h, Arc::clone(&bind))) as BoxedStep
            }))
            .build();

        dynaroute_telemetry::record_route_compiled(schema_id);

        Ok(CompiledRoute {
            schema_id: schema_id.to_string(),
            route_id: route_id.to_string(),
            kind,
            http_method,
            pattern: RoutePattern::new(http_route),
            pipeline,
            bind,
        })
    }

    fn resolve(&self, name: Option<&String>) -> Option<Arc<dyn RouteHandler>> {
        self.handlers.resolve(name?)
    }

    fn middlewares(&self, middlewares: &[MiddlewareRef], bind: &Arc<BindContext>) -> Vec<BoxedStep> {
        middlewares
            .iter()
            .filter_map(|middleware| match middleware {
                MiddlewareRef::Step(step) => Some(Arc::clone(step)),
                MiddlewareRef::Named(name) => match self.handlers.resolve(name) {
                    Some(handler) => Some(Arc::new(BoundStep::new(
                        name.trim().to_string(),
                        handler,
                        Arc::clone(bind),
                    )) as BoxedStep),
                    None => {
                        warn!(middleware = %name, schema_id = %bind.id, "Middleware not registered, skipping");
                        None
                    }
                },
            })
            .collect()
    }
}

impl std::fmt::Debug for SchemaCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut overridden: Vec<&str> = self.default_handlers.keys().map(|k| k.as_str()).collect();
        overridden.sort_unstable();
        f.debug_struct("SchemaCompiler")
            .field("handlers", &self.handlers)
            .field("default_handlers", &overridden)
            .finish_non_exhaustive()
    }
}
