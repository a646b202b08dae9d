//! Header and body validation steps.
//!
//! Both steps answer a failed validation themselves with `400` and halt the
//! route; the failure never reaches the dispatcher as an error.

use crate::step::{Flow, Step, StepResult};
use dynaroute_core::{BoxFuture, Request, Response, ValidationOptions, Validator};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;

/// Validates request headers. Undeclared headers are allowed.
pub struct ValidateHeaders {
    schema: Arc<dyn Validator>,
}

impl ValidateHeaders {
    /// Step name.
    pub const NAME: &'static str = "validate_headers";

    /// Creates the step.
    pub fn new(schema: Arc<dyn Validator>) -> Self {
        Self { schema }
    }

    fn check(&self, request: &Request, response: &mut Response) -> StepResult {
        let headers = request.headers_json();
        match self.schema.validate(&headers, &ValidationOptions::lenient()) {
            Ok(_) => Ok(Flow::Proceed),
            Err(err) => {
                tracing::info!(path = %err.path, reason = %err.message, "Header validation failed");
                dynaroute_telemetry::record_validation_failure(Self::NAME);
                response
                    .status(StatusCode::BAD_REQUEST)
                    .json(json!({ "message": "IncompleteRequestHeaders" }));
                Ok(Flow::Halt)
            }
        }
    }
}

impl Step for ValidateHeaders {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn call<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult> {
        let result = self.check(request, response);
        Box::pin(async move { result })
    }
}

/// Validates the request body and replaces it with the normalized value.
pub struct ValidateBody {
    schema: Arc<dyn Validator>,
}

impl ValidateBody {
    /// Step name.
    pub const NAME: &'static str = "validate_body";

    /// Creates the step.
    pub fn new(schema: Arc<dyn Validator>) -> Self {
        Self { schema }
    }

    fn check(&self, request: &mut Request, response: &mut Response) -> StepResult {
        match self
            .schema
            .validate(request.body(), &ValidationOptions::default())
        {
            Ok(normalized) => {
                request.set_body(normalized);
                Ok(Flow::Proceed)
            }
            Err(err) => {
                tracing::info!(path = %err.path, reason = %err.message, "Body validation failed");
                dynaroute_telemetry::record_validation_failure(Self::NAME);
                response.status(StatusCode::BAD_REQUEST).json(json!({
                    "message": "InvalidRequestPayload",
                    "err": err.to_json(),
                }));
                Ok(Flow::Halt)
            }
        }
    }
}

impl Step for ValidateBody {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn call<'a>(
        &'a self,
        request: &'a mut Request,
        response: &'a mut Response,
    ) -> BoxFuture<'a, StepResult> {
        let result = self.check(request, response);
        Box::pin(async move { result })
    }
}
