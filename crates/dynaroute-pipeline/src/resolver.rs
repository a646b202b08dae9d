//! Picking the factory and factory method for a request.

use crate::operation::OperationKind;
use crate::step::BindContext;
use dynaroute_core::{Factory, FactoryCall, FactoryOperation, Request, RouteResult};
use serde_json::Value;
use std::sync::Arc;

/// What a factory call produced, shaped by its operation.
#[derive(Debug, Clone, PartialEq)]
pub enum FactoryOutput {
    /// Items of a `list` call.
    Items(Vec<Value>),
    /// The item of a `get`, `create` or `update` call.
    Item(Value),
    /// A `remove` call finished.
    Removed,
}

impl FactoryOutput {
    /// Returns the raw result as JSON, as stored in the request context.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Items(items) => Value::Array(items.clone()),
            Self::Item(item) => item.clone(),
            Self::Removed => Value::Null,
        }
    }
}

/// Resolves factories for routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactoryResolver;

impl FactoryResolver {
    /// Returns the factory a request should use.
    ///
    /// In order: the factory already stored in the request context, the
    /// route's named factory if registered, the default factory for the
    /// route's model id.
    #[must_use]
    pub fn resolve(bind: &BindContext, request: &Request) -> Arc<dyn Factory> {
        if let Some(factory) = request.context().factory() {
            return factory;
        }

        let factories = bind.services.factories();
        if let Some(name) = bind.factory_name.as_deref() {
            if let Some(factory) = factories.get(name) {
                return factory;
            }
            tracing::debug!(
                schema_id = %bind.id,
                factory = name,
                "Named factory not registered, using default"
            );
        }

        factories.default_for(&bind.id, bind.model_schema.as_ref())
    }

    /// Calls the factory method for an operation kind.
    ///
    /// `method` overrides the canonical method name. A factory that does not
    /// know the override is called through its canonical method instead.
    pub async fn call(
        factory: &dyn Factory,
        bind: &BindContext,
        kind: OperationKind,
        call: FactoryCall<'_>,
    ) -> RouteResult<FactoryOutput> {
        let operation = kind.factory_operation();

        if let Some(method) = bind.factory_method.as_deref() {
            if method != operation.as_str() {
                if let Some(custom) = factory.call_custom(method, operation, call) {
                    return custom.await.map(|value| shape(operation, value));
                }
                tracing::info!(
                    schema_id = %bind.id,
                    method,
                    fallback = operation.as_str(),
                    "No factory method for route, using default"
                );
            }
        }

        match operation {
            FactoryOperation::List => factory.list(call).await.map(FactoryOutput::Items),
            FactoryOperation::Get => factory.get(call).await.map(FactoryOutput::Item),
            FactoryOperation::Create => factory.create(call).await.map(FactoryOutput::Item),
            FactoryOperation::Update => factory.update(call).await.map(FactoryOutput::Item),
            FactoryOperation::Remove => factory.remove(call).await.map(|()| FactoryOutput::Removed),
        }
    }
}

fn shape(operation: FactoryOperation, value: Value) -> FactoryOutput {
    match operation {
        FactoryOperation::List => FactoryOutput::Items(match value {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        }),
        FactoryOperation::Remove => FactoryOutput::Removed,
        FactoryOperation::Get | FactoryOperation::Create | FactoryOperation::Update => {
            FactoryOutput::Item(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynaroute_core::{BoxFuture, FactoryRegistry, Params, RouteError, Services};
    use http::{Method, StatusCode};
    use serde_json::{json, Map};

    struct Devices;

    impl Factory for Devices {
        fn list<'a>(&'a self, _call: FactoryCall<'a>) -> BoxFuture<'a, RouteResult<Vec<Value>>> {
            Box::pin(async { Ok(vec![json!({"id": "d1"})]) })
        }

        fn call_custom<'a>(
            &'a self,
            method: &str,
            _operation: FactoryOperation,
            _call: FactoryCall<'a>,
        ) -> Option<BoxFuture<'a, RouteResult<Value>>> {
            let value = match method {
                "listActive" => json!([{"id": "d2"}, {"id": "d3"}]),
                "findOne" => json!({"id": "d9"}),
                _ => return None,
            };
            Some(Box::pin(async move { Ok(value) }))
        }
    }

    fn services() -> Arc<Services> {
        let mut factories = FactoryRegistry::new();
        factories.register("devices", Arc::new(Devices));
        Arc::new(Services::new(factories))
    }

    fn call_parts() -> (Params, Map<String, Value>, Value) {
        (Params::new(), Map::new(), json!({}))
    }

    #[test]
    fn test_resolve_prefers_context_factory() {
        let bind = BindContext::new("devices", services())
            .with_factory_name(Some("devices".to_string()));
        let mut request = Request::new(Method::GET, "/devices");
        let preset: Arc<dyn Factory> = Arc::new(Devices);
        request.context_mut().set_factory(Arc::clone(&preset));

        let resolved = FactoryResolver::resolve(&bind, &request);
        assert!(Arc::ptr_eq(&resolved, &preset));
    }

    #[test]
    fn test_resolve_named_then_default() {
        let services = services();
        let request = Request::new(Method::GET, "/devices");

        let named = BindContext::new("devices", Arc::clone(&services))
            .with_factory_name(Some("devices".to_string()));
        let from_registry = services.factories().get("devices").unwrap();
        assert!(Arc::ptr_eq(
            &FactoryResolver::resolve(&named, &request),
            &from_registry
        ));

        let unknown = BindContext::new("users", Arc::clone(&services))
            .with_factory_name(Some("people".to_string()));
        let first = FactoryResolver::resolve(&unknown, &request);
        let plain = BindContext::new("users", services);
        let second = FactoryResolver::resolve(&plain, &request);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_call_canonical_method() {
        let bind = BindContext::new("devices", services());
        let (params, query, body) = call_parts();
        let call = FactoryCall {
            params: &params,
            query: &query,
            body: &body,
            user: None,
        };

        let output = FactoryResolver::call(&Devices, &bind, OperationKind::List, call)
            .await
            .unwrap();
        assert_eq!(output, FactoryOutput::Items(vec![json!({"id": "d1"})]));
    }

    #[tokio::test]
    async fn test_call_custom_method() {
        let bind = BindContext::new("devices", services())
            .with_factory_method(Some("listActive".to_string()));
        let (params, query, body) = call_parts();
        let call = FactoryCall {
            params: &params,
            query: &query,
            body: &body,
            user: None,
        };

        let output = FactoryResolver::call(&Devices, &bind, OperationKind::List, call)
            .await
            .unwrap();
        assert_eq!(
            output.to_value(),
            json!([{"id": "d2"}, {"id": "d3"}])
        );
    }

    #[tokio::test]
    async fn test_missing_custom_method_falls_back() {
        let bind = BindContext::new("devices", services())
            .with_factory_method(Some("listArchived".to_string()));
        let (params, query, body) = call_parts();
        let call = FactoryCall {
            params: &params,
            query: &query,
            body: &body,
            user: None,
        };

        let output = FactoryResolver::call(&Devices, &bind, OperationKind::List, call)
            .await
            .unwrap();
        assert_eq!(output, FactoryOutput::Items(vec![json!({"id": "d1"})]));
    }

    #[tokio::test]
    async fn test_base_factory_not_implemented() {
        let services = Arc::new(Services::default());
        let bind = BindContext::new("users", Arc::clone(&services));
        let factory = FactoryResolver::resolve(&bind, &Request::new(Method::GET, "/users"));
        let (params, query, body) = call_parts();
        let call = FactoryCall {
            params: &params,
            query: &query,
            body: &body,
            user: None,
        };

        let err = FactoryResolver::call(factory.as_ref(), &bind, OperationKind::Get, call)
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::NotImplemented { .. }));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_shape_custom_results() {
        assert_eq!(
            shape(FactoryOperation::List, Value::Null),
            FactoryOutput::Items(Vec::new())
        );
        assert_eq!(
            shape(FactoryOperation::List, json!({"id": 1})),
            FactoryOutput::Items(vec![json!({"id": 1})])
        );
        assert_eq!(
            shape(FactoryOperation::Remove, json!({"ok": true})),
            FactoryOutput::Removed
        );
        assert_eq!(FactoryOutput::Removed.to_value(), Value::Null);
    }
}
