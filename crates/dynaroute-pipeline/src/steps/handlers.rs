//! Default handlers and the echo handler.

use crate::operation::OperationKind;
use crate::resolver::{FactoryOutput, FactoryResolver};
use crate::step::{handler_fn, BindContext, Flow, RouteHandler, Step, StepResult};
use dynaroute_core::{BoxFuture, FactoryCall, Request, Response};
use http::StatusCode;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Answers a request with the route's factory.
///
/// | Kind | Status | Body |
/// |------|--------|------|
/// | `list` | 200 | `{ "<id>": [items] }`, null items dropped |
/// | `get` | 200 | the item |
/// | `post` | 201 | the created item |
/// | `put`, `patch` | 200 | the updated item |
/// | `delete` | 204 | `{}` |
///
/// `patch` has no behavior of its own: it calls the factory's update
/// operation and answers exactly like `put`.
///
/// The raw factory result is stored as the request's response object for
/// post handlers. A factory error is written as `{status, message}` with its
/// status and returned to the dispatcher.
pub struct DefaultHandler {
    name: String,
    kind: OperationKind,
    bind: Arc<BindContext>,
}

impl DefaultHandler {
    /// Creates the default handler for an operation kind.
    pub fn new(kind: OperationKind, bind: Arc<BindContext>) -> Self {
        Self {
            name: format!("default_{kind}"),
            kind,
            bind,
        }
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    async fn handle(&self, request: &mut Request, response: &mut Response) -> StepResult {
        let factory = FactoryResolver::resolve(&self.bind, request);
        let result = {
            let call = FactoryCall {
                params: request.params(),
                query: request.query(),
                body: request.body(),
                user: request.user(),
            };
            FactoryResolver::call(factory.as_ref(), &self.bind, self.kind, call).await
        };

        let output = match result {
            Ok(output) => output,
            Err(error) => {
                tracing::warn!(
                    schema_id = %self.bind.id,
                    operation = %self.kind,
                    error = %error,
                    "Factory call failed"
                );
                response
                    .status(error.status_code())
                    .json(serde_json::to_value(error.to_body()).unwrap_or_default());
                return Err(error);
            }
        };

        request.context_mut().set_response_object(output.to_value());

        match output {
            FactoryOutput::Items(items) => {
                let items: Vec<Value> = items.into_iter().filter(|i| !i.is_null()).collect();
                let mut body = Map::new();
                body.insert(self.bind.id.clone(), Value::Array(items));
                response.status(StatusCode::OK).json(Value::Object(body));
            }
            FactoryOutput::Item(item) => {
                let status = if self.kind == OperationKind::Post {
                    StatusCode::CREATED
                } else {
                    StatusCode::OK
                };
                response.status(status).json(item);
            }
            FactoryOutput::Removed => {
                response.status(StatusCode::NO_CONTENT).json(json!({}));
            }
        }

        Ok(Flow::Proceed)
    }
}

impl Step for DefaultHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn call<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(self.handle(request, response))
    }
}

/// A handler that answers with what it was asked: the route id, method,
/// path, params, body and query.
///
/// Useful as a placeholder while a route's factory is being written.
pub fn echo_handler() -> Arc<dyn RouteHandler> {
    handler_fn(|bind, request, response| {
        Box::pin(async move {
            response.json(json!({
                "id": bind.id,
                "method": request.method().as_str(),
                "path": request.path(),
                "params": request.params_json(),
                "body": request.body(),
                "query": request.query(),
            }));
            Ok(Flow::Proceed)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynaroute_core::{
        Factory, FactoryOperation, FactoryRegistry, Params, RouteError, RouteResult, Services,
    };
    use http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Devices {
        removed: AtomicUsize,
    }

    impl Factory for Devices {
        fn list<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Vec<Value>>> {
            let owner = call.user.and_then(|u| u.id.clone());
            Box::pin(async move {
                Ok(vec![
                    json!({"id": "d1", "owner": owner}),
                    Value::Null,
                    json!({"id": "d2", "owner": owner}),
                ])
            })
        }

        fn get<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Value>> {
            let id = call.params.named("deviceId").map(str::to_string);
            Box::pin(async move {
                match id.as_deref() {
                    Some("d1") => Ok(json!({"id": "d1"})),
                    _ => Err(RouteError::factory(StatusCode::NOT_FOUND, "DeviceNotFound")),
                }
            })
        }

        fn create<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Value>> {
            let mut created = call.body.clone();
            created["id"] = json!("d3");
            Box::pin(async move { Ok(created) })
        }

        fn update<'a>(&'a self, call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Value>> {
            let body = call.body.clone();
            Box::pin(async move { Ok(body) })
        }

        fn remove<'a>(&'a self, _call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<()>> {
            self.removed.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        }

        fn call_custom<'a>(
            &'a self,
            method: &str,
            operation: FactoryOperation,
            _call: FactoryCall<'a>,
        ) -> Option<BoxFuture<'a, RouteResult<Value>>> {
            (method == "listMine" && operation == FactoryOperation::List)
                .then(|| -> BoxFuture<'a, RouteResult<Value>> {
                    Box::pin(async { Ok(json!([{"id": "mine"}])) })
                })
        }
    }

    fn bind(method: Option<&str>) -> (Arc<BindContext>, Arc<Devices>) {
        let devices = Arc::new(Devices::default());
        let mut factories = FactoryRegistry::new();
        factories.register("devices", Arc::clone(&devices) as Arc<dyn Factory>);
        let bind = BindContext::new("devices", Arc::new(Services::new(factories)))
            .with_factory_name(Some("devices".to_string()))
            .with_factory_method(method.map(str::to_string));
        (Arc::new(bind), devices)
    }

    async fn run(kind: OperationKind, bind: Arc<BindContext>, mut req: Request) -> (Request, Response, StepResult) {
        let handler = DefaultHandler::new(kind, bind);
        let mut res = Response::new();
        let result = handler.call(&mut req, &mut res).await;
        (req, res, result)
    }

    #[tokio::test]
    async fn test_list_wraps_items_under_id() {
        let (bind, _) = bind(None);
        let req = Request::new(Method::GET, "/devices").with_user(dynaroute_core::Principal::with_id("u1"));
        let (req, res, result) = run(OperationKind::List, bind, req).await;

        assert_eq!(result.unwrap(), Flow::Proceed);
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(
            res.body().unwrap(),
            &json!({"devices": [{"id": "d1", "owner": "u1"}, {"id": "d2", "owner": "u1"}]})
        );
        assert_eq!(req.context().response_object().unwrap().as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_custom_method() {
        let (bind, _) = bind(Some("listMine"));
        let (_, res, _) = run(OperationKind::List, bind, Request::new(Method::GET, "/devices")).await;
        assert_eq!(res.body().unwrap(), &json!({"devices": [{"id": "mine"}]}));
    }

    #[tokio::test]
    async fn test_get_found_and_missing() {
        let (bind, _) = bind(None);
        let mut params = Params::new();
        params.push(":deviceId", "d1");
        let mut req = Request::new(Method::GET, "/devices/d1");
        req.set_params(params);
        let (_, res, result) = run(OperationKind::Get, Arc::clone(&bind), req).await;
        assert!(result.is_ok());
        assert_eq!(res.body().unwrap(), &json!({"id": "d1"}));

        let (_, res, result) = run(OperationKind::Get, bind, Request::new(Method::GET, "/devices/x")).await;
        let err = result.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body().unwrap(), &json!({"status": 404, "message": "DeviceNotFound"}));
    }

    #[tokio::test]
    async fn test_post_answers_201() {
        let (bind, _) = bind(None);
        let req = Request::new(Method::POST, "/devices").with_body(json!({"name": "probe"}));
        let (req, res, _) = run(OperationKind::Post, bind, req).await;

        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(res.body().unwrap(), &json!({"name": "probe", "id": "d3"}));
        assert_eq!(req.context().response_object(), res.body());
    }

    #[tokio::test]
    async fn test_put_and_patch_update() {
        for kind in [OperationKind::Put, OperationKind::Patch] {
            let (bind, _) = bind(None);
            let req = Request::new(Method::PUT, "/devices/d1").with_body(json!({"name": "renamed"}));
            let (_, res, _) = run(kind, bind, req).await;
            assert_eq!(res.status_code(), StatusCode::OK);
            assert_eq!(res.body().unwrap()["name"], "renamed");
        }
    }

    #[tokio::test]
    async fn test_delete_answers_204() {
        let (bind, devices) = bind(Some("purge"));
        let (_, res, result) = run(OperationKind::Delete, bind, Request::new(Method::DELETE, "/devices/d1")).await;

        assert_eq!(result.unwrap(), Flow::Proceed);
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
        assert_eq!(res.body().unwrap(), &json!({}));
        assert_eq!(devices.removed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_base_factory_needs_override() {
        let bind = Arc::new(BindContext::new("widgets", Arc::new(Services::default())));
        let (_, res, result) = run(OperationKind::Get, bind, Request::new(Method::GET, "/widgets")).await;

        assert!(matches!(result, Err(RouteError::NotImplemented { .. })));
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.body().unwrap()["message"], "NeedFunctionOverride");
    }

    #[test]
    fn test_step_names() {
        let (bind, _) = bind(None);
        assert_eq!(DefaultHandler::new(OperationKind::List, Arc::clone(&bind)).name(), "default_list");
        assert_eq!(DefaultHandler::new(OperationKind::Delete, bind).kind(), OperationKind::Delete);
    }

    #[tokio::test]
    async fn test_echo_handler() {
        let (bind, _) = bind(None);
        let mut req = Request::new(Method::GET, "/devices").with_query("page", "2");
        let mut res = Response::new();
        echo_handler().call(&bind, &mut req, &mut res).await.unwrap();

        let body = res.body().unwrap();
        assert_eq!(body["id"], "devices");
        assert_eq!(body["method"], "GET");
        assert_eq!(body["query"]["page"], "2");
    }
}
