//! The output of the compiler.

use dynaroute_core::{media_type, Params, Request, Response, RouteError, RouteResult};
use dynaroute_pipeline::{BindContext, DispatchOutcome, Dispatcher, OperationKind, Pipeline};
use dynaroute_router::RoutePattern;
use http::Method;
use std::sync::Arc;

/// Body media types accepted on `POST` and `PUT`.
pub const ACCEPTED_BODY_TYPES: [&str; 2] = ["application/json", "application/x-www-form-urlencoded"];

/// One route of one schema, ready to serve requests.
///
/// Immutable once built. Share it with `Arc` across request tasks.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub(crate) schema_id: String,
    pub(crate) route_id: String,
    pub(crate) kind: OperationKind,
    pub(crate) http_method: Method,
    pub(crate) pattern: RoutePattern,
    pub(crate) pipeline: Pipeline,
    pub(crate) bind: Arc<BindContext>,
}

impl CompiledRoute {
    /// Returns the id of the schema the route came from.
    #[must_use]
    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// Returns the route id.
    #[must_use]
    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Returns the HTTP method the route answers.
    #[must_use]
    pub const fn http_method(&self) -> &Method {
        &self.http_method
    }

    /// Returns the route path, e.g. `/v1/devices/:id`.
    #[must_use]
    pub fn http_route(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the compiled path pattern.
    #[must_use]
    pub const fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Returns the step pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Returns the names of the steps, in order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.pipeline.step_names()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.pipeline.step_count()
    }

    /// Returns the route's bind context.
    #[must_use]
    pub fn bind(&self) -> &BindContext {
        &self.bind
    }

    /// Checks a request's method and content type against the route.
    ///
    /// `POST` and `PUT` need a JSON or form body. Any method other than
    /// `OPTIONS` must be the route's method.
    ///
    /// ```
    /// # use dynaroute_schema::{RouteDefinition, SchemaCompiler, SchemaDefinition};
    /// # use http::Method;
    /// # let schema = SchemaDefinition::builder().route("post", RouteDefinition::new()).build();
    /// # let route = SchemaCompiler::default().compile(&schema, "devices", "post").unwrap();
    /// assert!(route.validate_request(&Method::POST, Some("application/json; charset=utf-8")).is_ok());
    /// assert!(route.validate_request(&Method::POST, None).is_err());
    /// assert!(route.validate_request(&Method::GET, None).is_err());
    /// assert!(route.validate_request(&Method::OPTIONS, None).is_ok());
    /// ```
    pub fn validate_request(&self, method: &Method, content_type: Option<&str>) -> RouteResult<()> {
        if *method == Method::POST || *method == Method::PUT {
            let accepted = content_type
                .map(media_type)
                .is_some_and(|media| ACCEPTED_BODY_TYPES.contains(&media.as_str()));
            if !accepted {
                return Err(RouteError::forbidden(format!(
                    "{method} needs a JSON or form body, got {}",
                    content_type.unwrap_or("no content type")
                )));
            }
        }

        if *method != Method::OPTIONS && *method != self.http_method {
            return Err(RouteError::forbidden(format!(
                "invalid method {method}, wanted {}",
                self.http_method
            )));
        }

        Ok(())
    }

    /// Extracts path parameters from a request path.
    pub fn extract_params(&self, request_path: &str) -> RouteResult<Params> {
        Ok(self.pattern.extract_params(request_path)?)
    }

    /// Runs the route's steps against a request whose params are already set.
    pub async fn dispatch(&self, request: &mut Request, response: &mut Response) -> DispatchOutcome {
        Dispatcher::run(&self.pipeline, request, response).await
    }

    /// Checks the request, extracts its params and runs the steps.
    ///
    /// Guard and path failures are returned before any step runs; nothing is
    /// written to the response in that case.
    pub async fn run(
        &self,
        request: &mut Request,
        response: &mut Response,
    ) -> RouteResult<DispatchOutcome> {
        self.validate_request(request.method(), request.content_type())?;
        let params = self.extract_params(request.path())?;
        request.set_params(params);
        Ok(self.dispatch(request, response).await)
    }
}
