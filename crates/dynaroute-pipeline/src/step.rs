//! The step abstraction that compiled routes are made of.
//!
//! A route is a fixed list of [`Step`]s. Each step gets the request and the
//! response by mutable reference and answers with a [`Flow`]:
//!
//! - `Ok(Flow::Proceed)` hands control to the next step
//! - `Ok(Flow::Halt)` stops the route; the step has written the response
//! - `Err(error)` stops the route and reports `error` to the dispatcher
//!
//! Steps return exactly once, so a step can never advance the chain twice.

use dynaroute_core::{BoxFuture, Request, Response, RouteError, Services, Validator};
use std::fmt;
use std::sync::Arc;

/// What the dispatcher should do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the next step.
    Proceed,
    /// Stop without error.
    Halt,
}

/// The result of one step.
pub type StepResult = Result<Flow, RouteError>;

/// One unit of request processing.
///
/// # Example
///
/// ```
/// use dynaroute_core::{BoxFuture, Request, Response};
/// use dynaroute_pipeline::{Flow, Step, StepResult};
///
/// struct Stamp;
///
/// impl Step for Stamp {
///     fn name(&self) -> &str {
///         "stamp"
///     }
///
///     fn call<'a>(&'a self, _req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, StepResult> {
///         Box::pin(async move {
///             res.header("x-stamped", "1");
///             Ok(Flow::Proceed)
///         })
///     }
/// }
/// ```
pub trait Step: Send + Sync {
    /// Returns the step name used in logs and dispatch outcomes.
    fn name(&self) -> &str;

    /// Runs the step.
    fn call<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult>;
}

impl fmt::Debug for dyn Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Step").field(&self.name()).finish()
    }
}

/// A step built from an async closure.
///
/// ```
/// use dynaroute_pipeline::{Flow, FnStep};
///
/// let step = FnStep::new("tag", |req, _res| {
///     Box::pin(async move {
///         req.context_mut().set_extension(String::from("tagged"));
///         Ok(Flow::Proceed)
///     })
/// });
/// ```
pub struct FnStep<F> {
    name: String,
    func: F,
}

impl<F> FnStep<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, StepResult>
        + Send
        + Sync,
{
    /// Creates a step from a closure returning a boxed future.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Step for FnStep<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, StepResult>
        + Send
        + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult> {
        (self.func)(request, response)
    }
}

/// A step built from a synchronous closure.
pub struct SyncStep<F> {
    name: String,
    func: F,
}

impl<F> SyncStep<F>
where
    F: Fn(&mut Request, &mut Response) -> StepResult + Send + Sync,
{
    /// Creates a step from a closure that finishes without awaiting.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Step for SyncStep<F>
where
    F: Fn(&mut Request, &mut Response) -> StepResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult> {
        let result = (self.func)(request, response);
        Box::pin(async move { result })
    }
}

/// Route-level data shared by every step of one compiled route.
#[derive(Clone)]
pub struct BindContext {
    /// The model id, also the key of list responses.
    pub id: String,
    /// The model validation schema.
    pub model_schema: Option<Arc<dyn Validator>>,
    /// Named factory to use instead of the default one.
    pub factory_name: Option<String>,
    /// Factory method to call instead of the canonical one.
    pub factory_method: Option<String>,
    /// Services the route was compiled against.
    pub services: Arc<Services>,
}

impl BindContext {
    /// Creates a bind context with no factory overrides.
    pub fn new(id: impl Into<String>, services: Arc<Services>) -> Self {
        Self {
            id: id.into(),
            model_schema: None,
            factory_name: None,
            factory_method: None,
            services,
        }
    }

    /// Sets the model schema.
    #[must_use]
    pub fn with_model_schema(mut self, schema: Option<Arc<dyn Validator>>) -> Self {
        self.model_schema = schema;
        self
    }

    /// Sets the named factory.
    #[must_use]
    pub fn with_factory_name(mut self, name: Option<String>) -> Self {
        self.factory_name = name;
        self
    }

    /// Sets the factory method override.
    #[must_use]
    pub fn with_factory_method(mut self, method: Option<String>) -> Self {
        self.factory_method = method;
        self
    }
}

impl fmt::Debug for BindContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindContext")
            .field("id", &self.id)
            .field("has_model_schema", &self.model_schema.is_some())
            .field("factory_name", &self.factory_name)
            .field("factory_method", &self.factory_method)
            .finish_non_exhaustive()
    }
}

/// A handler that can be registered by name and bound into routes.
///
/// Unlike a [`Step`], a handler receives the route's [`BindContext`], so one
/// handler value can serve many routes.
pub trait RouteHandler: Send + Sync {
    /// Runs the handler for one request.
    fn call<'a>(
        &'a self,
        bind: &'a BindContext,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult>;
}

/// A [`RouteHandler`] built from a closure.
pub struct HandlerFn<F>(F);

impl<F> HandlerFn<F>
where
    F: for<'a> Fn(&'a BindContext, &'a mut Request, &'a mut Response) -> BoxFuture<'a, StepResult>
        + Send
        + Sync,
{
    /// Wraps a closure.
    pub const fn new(func: F) -> Self {
        Self(func)
    }
}

impl<F> RouteHandler for HandlerFn<F>
where
    F: for<'a> Fn(&'a BindContext, &'a mut Request, &'a mut Response) -> BoxFuture<'a, StepResult>
        + Send
        + Sync,
{
    fn call<'a>(
        &'a self,
        bind: &'a BindContext,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult> {
        (self.0)(bind, request, response)
    }
}

/// Wraps a closure as a shared [`RouteHandler`].
///
/// Convenience for handlers written as `async fn`:
///
/// ```
/// use dynaroute_core::{Request, Response};
/// use dynaroute_pipeline::{handler_fn, BindContext, Flow, StepResult};
///
/// async fn hello(bind: &BindContext, _req: &mut Request, res: &mut Response) -> StepResult {
///     res.json(serde_json::json!({ "id": bind.id }));
///     Ok(Flow::Proceed)
/// }
///
/// let handler = handler_fn(|b, req, res| Box::pin(hello(b, req, res)));
/// ```
pub fn handler_fn<F>(func: F) -> Arc<dyn RouteHandler>
where
    F: for<'a> Fn(&'a BindContext, &'a mut Request, &'a mut Response) -> BoxFuture<'a, StepResult>
        + Send
        + Sync
        + 'static,
{
    Arc::new(HandlerFn::new(func))
}

/// A registered handler bound to one route.
pub struct BoundStep {
    name: String,
    handler: Arc<dyn RouteHandler>,
    bind: Arc<BindContext>,
}

impl BoundStep {
    /// Binds `handler` to a route.
    pub fn new(
        name: impl Into<String>,
        handler: Arc<dyn RouteHandler>,
        bind: Arc<BindContext>,
    ) -> Self {
        Self {
            name: name.into(),
            handler,
            bind,
        }
    }

    /// Returns the bind context.
    #[must_use]
    pub fn bind(&self) -> &BindContext {
        &self.bind
    }
}

impl Step for BoundStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn call<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult> {
        self.handler.call(&self.bind, request, response)
    }
}
