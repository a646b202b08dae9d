//! Sequential execution of a pipeline against one request.
//!
//! The dispatcher is the single terminal handler of a route: steps never deal
//! with each other's errors, they return them and the dispatcher stops, logs
//! and reports the outcome. A panicking step is caught and turned into a
//! `500` [`RouteError::Internal`].

use crate::pipeline::Pipeline;
use crate::step::Flow;
use dynaroute_core::{Request, Response, RouteError};
use dynaroute_telemetry::InFlightGuard;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::Instrument;

/// How a dispatch ended.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Every step proceeded.
    Completed,
    /// A step stopped the route after writing the response.
    Halted {
        /// The step that halted.
        step: String,
    },
    /// A step failed.
    Failed {
        /// The failing step.
        step: String,
        /// The error it returned.
        error: RouteError,
    },
}

impl DispatchOutcome {
    /// Returns the metric label for this outcome.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Halted { .. } => "halted",
            Self::Failed { .. } => "failed",
        }
    }

    /// Returns true if every step proceeded.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if a step failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns the name of the step that ended the dispatch early.
    #[must_use]
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::Completed => None,
            Self::Halted { step } | Self::Failed { step, .. } => Some(step),
        }
    }

    /// Returns the error of a failed dispatch.
    #[must_use]
    pub const fn error(&self) -> Option<&RouteError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Consumes the outcome and returns the error of a failed dispatch.
    #[must_use]
    pub fn into_error(self) -> Option<RouteError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Runs pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher;

impl Dispatcher {
    /// Runs every step of `pipeline` in order against one request.
    ///
    /// Never panics outward and never returns an error: failures are logged
    /// here and reported through the returned [`DispatchOutcome`].
    pub async fn run(
        pipeline: &Pipeline,
        request: &mut Request,
        response: &mut Response,
    ) -> DispatchOutcome {
        let _in_flight = InFlightGuard::new();
        let started = Instant::now();
        let span = tracing::debug_span!(
            "dispatch",
            request_id = %request.context().request_id(),
            route = pipeline.label(),
            http.method = %request.method(),
        );

        let outcome = Self::run_steps(pipeline, request, response)
            .instrument(span.clone())
            .await;

        let _entered = span.enter();
        let elapsed = started.elapsed();
        match &outcome {
            DispatchOutcome::Failed { step, error } => {
                tracing::error!(
                    step = %step,
                    http.status_code = error.status_code().as_u16(),
                    error = %error,
                    "Route step failed"
                );
            }
            DispatchOutcome::Halted { step } => {
                tracing::debug!(
                    step = %step,
                    http.status_code = response.status_code().as_u16(),
                    "Route halted"
                );
            }
            DispatchOutcome::Completed => {
                tracing::debug!(
                    http.status_code = response.status_code().as_u16(),
                    duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "Route completed"
                );
            }
        }

        dynaroute_telemetry::record_dispatch(pipeline.label(), outcome.label(), elapsed);
        outcome
    }

    async fn run_steps(
        pipeline: &Pipeline,
        request: &mut Request,
        response: &mut Response,
    ) -> DispatchOutcome {
        for step in pipeline.steps() {
            let result = AssertUnwindSafe(async { step.call(request, response).await })
                .catch_unwind()
                .await;

            match result {
                Ok(Ok(Flow::Proceed)) => {}
                Ok(Ok(Flow::Halt)) => {
                    return DispatchOutcome::Halted {
                        step: step.name().to_string(),
                    };
                }
                Ok(Err(error)) => {
                    return DispatchOutcome::Failed {
                        step: step.name().to_string(),
                        error,
                    };
                }
                Err(panic) => {
                    return DispatchOutcome::Failed {
                        step: step.name().to_string(),
                        error: RouteError::internal(format!(
                            "step panicked: {}",
                            panic_message(panic.as_ref())
                        )),
                    };
                }
            }
        }

        DispatchOutcome::Completed
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
