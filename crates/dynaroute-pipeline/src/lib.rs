//! Route pipelines for Dynaroute.
//!
//! A compiled route is a [`Pipeline`]: a fixed list of [`Step`]s that the
//! [`Dispatcher`] runs one at a time against a request. This crate provides
//! the pieces the schema compiler assembles routes from:
//!
//! - [`Step`], [`Flow`] and the closure adapters [`FnStep`] and [`SyncStep`]
//! - [`RouteHandler`] and [`BindContext`]: named handlers bound to a route
//! - [`HandlerRegistry`]: dotted-name lookup of handlers at compile time
//! - [`FactoryResolver`]: factory and factory-method selection per request
//! - [`steps`]: validation, principal loading, factory loading and the
//!   default handlers
//! - [`Dispatcher`]: sequential execution with first-error short-circuiting
//!
//! # Example
//!
//! ```
//! use dynaroute_core::{Request, Response};
//! use dynaroute_pipeline::{Dispatcher, Flow, Pipeline};
//! use http::Method;
//!
//! # tokio_test::block_on(async {
//! let pipeline = Pipeline::builder("/ping")
//!     .sync_step("pong", |_req, res| {
//!         res.json(serde_json::json!({"pong": true}));
//!         Ok(Flow::Proceed)
//!     })
//!     .build();
//!
//! let mut req = Request::new(Method::GET, "/ping");
//! let mut res = Response::new();
//! let outcome = Dispatcher::run(&pipeline, &mut req, &mut res).await;
//! assert!(outcome.is_completed());
//! # });
//! ```

#![forbid(unsafe_code)]

mod dispatcher;
mod operation;
mod pipeline;
mod registry;
mod resolver;
mod step;
pub mod steps;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use operation::OperationKind;
pub use pipeline::{BoxedStep, Pipeline, PipelineBuilder};
pub use registry::{HandlerRegistry, RegistryError};
pub use resolver::{FactoryOutput, FactoryResolver};
pub use step::{
    handler_fn, BindContext, BoundStep, Flow, FnStep, HandlerFn, RouteHandler, Step, StepResult,
    SyncStep,
};
