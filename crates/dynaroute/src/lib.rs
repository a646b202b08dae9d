//! # Dynaroute
//!
//! **Schema-driven route compilation and dispatch**
//!
//! Dynaroute turns declarative resource schemas into request handlers:
//!
//! - **Schemas** describe a resource's base path, data factory and routes,
//!   built in code or loaded from JSON/TOML documents
//! - **The compiler** flattens each route into a fixed list of steps:
//!   middlewares, validation, principal and factory loading, handlers
//! - **The dispatcher** runs those steps in order and stops at the first error
//! - **Handlers** are referenced by dotted name and resolved once, at compile time
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use dynaroute::prelude::*;
//! use http::{Method, StatusCode};
//!
//! let schema = SchemaDocument::from_json(r#"{
//!     "path": "/v1/devices",
//!     "routes": { "get": ":id", "post": { "handler": "devices.create" } }
//! }"#)
//! .unwrap()
//! .into_definition();
//!
//! let mut handlers = HandlerRegistry::new();
//! handlers
//!     .register_fn("devices.create", |_bind, req, res| {
//!         Box::pin(async move {
//!             res.status(StatusCode::CREATED).json(req.body().clone());
//!             Ok(Flow::Proceed)
//!         })
//!     })
//!     .unwrap();
//!
//! let served = serve_schema(&schema, "devices", "post", Arc::new(handlers), Arc::default()).unwrap();
//!
//! tokio_test::block_on(async {
//!     let request = Request::new(Method::POST, "/v1/devices")
//!         .with_header("content-type", "application/json")
//!         .with_body(serde_json::json!({"name": "lamp"}));
//!     let response = served.handle(request).await;
//!     assert_eq!(response.status_code(), StatusCode::CREATED);
//! });
//! ```
//!
//! ## Architecture
//!
//! Every compiled route runs the same fixed step order:
//!
//! ```text
//! middlewares → header validation → body validation → load principal
//!     → load factory → post validation → handler → post handler
//! ```
//!
//! Steps that a route does not configure are left out.

#![doc(html_root_url = "https://docs.rs/dynaroute/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod serve;
mod table;

pub use error::{ServeError, ServeResult};
pub use serve::{serve_schema, ServedRoute};
pub use table::RouteTable;

// Re-export core types
pub use dynaroute_core as core;

// Re-export router types
pub use dynaroute_router as router;

// Re-export pipeline types
pub use dynaroute_pipeline as pipeline;

// Re-export schema types
pub use dynaroute_schema as schema;

// Re-export telemetry
pub use dynaroute_telemetry as telemetry;

// Re-export configuration
pub use dynaroute_config as config;

pub use dynaroute_config::{ConfigLoader, DynarouteConfig, ServerSection};
pub use dynaroute_core::{
    Factory, FactoryRegistry, Request, Response, RouteError, RouteResult, Services,
};
pub use dynaroute_pipeline::{Flow, HandlerRegistry};
pub use dynaroute_schema::{
    CatalogDocument, CompileError, SchemaCatalog, SchemaCompiler, SchemaDefinition, SchemaDocument,
};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use dynaroute::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{serve_schema, RouteTable, ServeError, ServedRoute};

    pub use dynaroute_core::{
        BaseFactory, BoxFuture, Factory, FactoryCall, FactoryOperation, FactoryRegistry,
        FieldSchema, Principal, PrincipalSource, Request, Response, RouteError, RouteResult,
        Services, Session, Validator,
    };

    pub use dynaroute_pipeline::{
        handler_fn, BindContext, DispatchOutcome, Flow, HandlerRegistry, RouteHandler, Step,
        StepResult,
    };

    pub use dynaroute_schema::{
        CatalogDocument, CompileError, CompiledRoute, OperationKind, RouteDefinition,
        SchemaCatalog, SchemaCompiler, SchemaDefinition, SchemaDocument,
    };

    pub use dynaroute_config::{ConfigLoader, DynarouteConfig};
    pub use dynaroute_telemetry::{init_logging, LogConfig};
}
