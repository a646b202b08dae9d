//! Serving a single compiled route.

use std::sync::Arc;

use bytes::Bytes;
use dynaroute_core::{Request, Response, RouteError, Services};
use dynaroute_pipeline::HandlerRegistry;
use dynaroute_schema::{CompileResult, CompiledRoute, SchemaCompiler, SchemaSource};
use http_body_util::Full;

/// Compiles one route of a schema and wraps it for serving.
///
/// `source` is either a single schema or a catalog keyed by schema id; with a
/// catalog, `schema_id` selects the schema.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use dynaroute::{serve_schema, HandlerRegistry, Request, SchemaDefinition, Services};
/// use http::{Method, StatusCode};
///
/// let schema = SchemaDefinition::builder()
///     .path("/v1/devices")
///     .route("get", ":id")
///     .build();
/// let served = serve_schema(
///     &schema,
///     "devices",
///     "get",
///     Arc::new(HandlerRegistry::new()),
///     Arc::new(Services::default()),
/// )
/// .unwrap();
///
/// tokio_test::block_on(async {
///     let res = served.handle(Request::new(Method::PUT, "/v1/devices/42")).await;
///     assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
///     assert_eq!(res.body().unwrap()["message"], "Forbidden");
/// });
/// ```
pub fn serve_schema<'a>(
    source: impl Into<SchemaSource<'a>>,
    schema_id: &str,
    route_id: &str,
    registry: Arc<HandlerRegistry>,
    services: Arc<Services>,
) -> CompileResult<ServedRoute> {
    let compiler = SchemaCompiler::new(registry, services);
    compiler
        .compile(source, schema_id, route_id)
        .map(ServedRoute::new)
}

/// A compiled route ready to answer requests.
///
/// Cloning is cheap; clones share the compiled route.
#[derive(Debug, Clone)]
pub struct ServedRoute {
    route: Arc<CompiledRoute>,
}

impl ServedRoute {
    /// Wraps a compiled route.
    #[must_use]
    pub fn new(route: CompiledRoute) -> Self {
        Self {
            route: Arc::new(route),
        }
    }

    /// Returns the compiled route.
    #[must_use]
    pub fn route(&self) -> &CompiledRoute {
        &self.route
    }

    /// Answers one request.
    ///
    /// Guard and path failures are answered with their error body before any
    /// step runs. A failed dispatch that wrote nothing is answered the same way;
    /// anything a step wrote is kept.
    pub async fn handle(&self, mut request: Request) -> Response {
        let mut response = Response::new();

        match self.route.run(&mut request, &mut response).await {
            Ok(outcome) => {
                if let Some(error) = outcome.error() {
                    if !response.is_written() {
                        write_error(&mut response, error);
                    }
                }
            }
            Err(error) => {
                tracing::debug!(
                    route = %self.route.http_route(),
                    method = %request.method(),
                    path = %request.path(),
                    error = %error,
                    "Request rejected before dispatch"
                );
                write_error(&mut response, &error);
            }
        }

        response
    }

    /// Answers an `http` request.
    pub async fn handle_http(
        &self,
        request: http::Request<Full<Bytes>>,
    ) -> http::Response<Full<Bytes>> {
        match Request::from_http(request).await {
            Ok(request) => self.handle(request).await.into_http(),
            Err(error) => error_response(&error).into_http(),
        }
    }
}

/// Builds a response holding only the error body of `error`.
pub(crate) fn error_response(error: &RouteError) -> Response {
    let mut response = Response::new();
    write_error(&mut response, error);
    response
}

fn write_error(response: &mut Response, error: &RouteError) {
    response
        .status(error.status_code())
        .json(serde_json::to_value(error.to_body()).unwrap_or_default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynaroute_core::{BoxFuture, Factory, FactoryCall, FactoryRegistry, RouteResult};
    use dynaroute_schema::{RouteDefinition, SchemaDefinition};
    use http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    struct Lamps;

    impl Factory for Lamps {
        fn get<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Value>> {
            let id = call.params.named("id").unwrap_or_default().to_string();
            Box::pin(async move { Ok(json!({"id": id, "on": true})) })
        }
    }

    fn services() -> Arc<Services> {
        let mut factories = FactoryRegistry::new();
        factories.register("lamps", Arc::new(Lamps) as Arc<dyn Factory>);
        Arc::new(Services::new(factories))
    }

    fn schema() -> SchemaDefinition {
        SchemaDefinition::builder()
            .path("/v1/lamps")
            .use_factory("lamps")
            .route("get", ":id")
            .route("post", RouteDefinition::new().with_handler("lamps.reject"))
            .build()
    }

    fn served(route_id: &str) -> ServedRoute {
        let mut handlers = HandlerRegistry::new();
        handlers
            .register_fn("lamps.reject", |_bind, _req, _res| {
                Box::pin(async { Err(RouteError::invalid_payload("lamps are read-only")) })
            })
            .unwrap();
        serve_schema(&schema(), "lamps", route_id, Arc::new(handlers), services()).unwrap()
    }

    #[tokio::test]
    async fn test_handle_success() {
        let res = served("get")
            .handle(Request::new(Method::GET, "/v1/lamps/7"))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body().unwrap(), &json!({"id": "7", "on": true}));
    }

    #[tokio::test]
    async fn test_guard_error_becomes_body() {
        let res = served("get")
            .handle(Request::new(Method::GET, "/v1/lamps"))
            .await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(res.body().unwrap(), &json!({"status": 403, "message": "Forbidden"}));
    }

    #[tokio::test]
    async fn test_unwritten_failure_gets_envelope() {
        let request = Request::new(Method::POST, "/v1/lamps")
            .with_header("content-type", "application/json")
            .with_body(json!({}));
        let res = served("post").handle(request).await;

        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.body().unwrap()["message"], "InvalidRequestPayload");
    }

    #[tokio::test]
    async fn test_handle_http_round_trip() {
        let request = http::Request::builder()
            .method(Method::GET)
            .uri("/v1/lamps/3?verbose=1")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let response = served("get").handle_http(request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["id"], "3");
    }

    #[test]
    fn test_unknown_route_fails_to_compile() {
        let result = serve_schema(
            &schema(),
            "lamps",
            "delete",
            Arc::new(HandlerRegistry::new()),
            services(),
        );
        assert!(result.is_err());
    }
}
