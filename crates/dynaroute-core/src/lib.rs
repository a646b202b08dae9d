//! # Dynaroute Core
//!
//! Core types shared by every Dynaroute crate:
//!
//! - [`Request`] and [`Response`] - the request model steps read and the
//!   response they write
//! - [`RequestContext`] - per-request state passed from step to step
//! - [`RouteError`] - the error type of compiled routes
//! - [`Validator`] and [`FieldSchema`] - value validation with normalization
//! - [`Factory`], [`FactoryRegistry`] and [`Services`] - data-access
//!   capabilities resolved by compiled routes

#![doc(html_root_url = "https://docs.rs/dynaroute-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod factory;
mod request;
mod response;
mod services;
mod validation;

use std::future::Future;
use std::pin::Pin;

/// A boxed future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use context::{RequestContext, RequestId};
pub use dynaroute_router::Params;
pub use error::{ErrorBody, RouteError, RouteResult};
pub use factory::{
    BaseFactory, Factory, FactoryBuilder, FactoryCall, FactoryOperation, FactoryRegistry,
    PrincipalSource,
};
pub use request::{media_type, Principal, Request, Session};
pub use response::Response;
pub use services::{MissingService, Services};
pub use validation::{FieldKind, FieldSchema, ValidationError, ValidationOptions, Validator};
