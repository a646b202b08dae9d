//! # Dynaroute Schema
//!
//! Declarative resource schemas and the compiler that turns their routes into
//! step pipelines.
//!
//! - [`SchemaDefinition`] / [`RouteDefinition`] - schemas built in code
//! - [`SchemaDocument`] / [`CatalogDocument`] - schemas loaded from JSON or TOML
//! - [`SchemaCompiler`] - flattens one route into a [`CompiledRoute`]
//! - [`CompiledRoute`] - request guard, path parameters and dispatch
//!
//! # Example
//!
//! ```
//! use dynaroute_core::{Request, Response};
//! use dynaroute_schema::{SchemaCompiler, SchemaDefinition};
//! use http::{Method, StatusCode};
//!
//! let schema = SchemaDefinition::builder()
//!     .id("devices")
//!     .path("/v1/devices")
//!     .route("get", ":id")
//!     .build();
//! let route = SchemaCompiler::default().compile(&schema, "devices", "get").unwrap();
//!
//! tokio_test::block_on(async {
//!     let mut req = Request::new(Method::GET, "/v1/devices/42");
//!     let mut res = Response::new();
//!     let outcome = route.run(&mut req, &mut res).await.unwrap();
//!
//!     // No factory is registered for "devices", so the default one answers.
//!     assert!(outcome.is_failed());
//!     assert_eq!(req.params().get(":id"), Some("42"));
//!     assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
//! });
//! ```

#![doc(html_root_url = "https://docs.rs/dynaroute-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod compiled;
mod compiler;
mod definition;
mod document;
mod error;
pub mod shape;

pub use compiled::{CompiledRoute, ACCEPTED_BODY_TYPES};
pub use compiler::SchemaCompiler;
pub use definition::{
    MiddlewareRef, RouteDefinition, RouteEntry, SchemaCatalog, SchemaDefinition,
    SchemaDefinitionBuilder, SchemaSource,
};
pub use document::{
    CatalogDocument, DocumentFormat, RouteDocument, RouteDocumentEntry, SchemaDocument,
};
pub use dynaroute_pipeline::OperationKind;
pub use error::{CompileError, CompileResult};
