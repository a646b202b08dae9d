//! Dispatch and compilation metrics.
//!
//! Metrics are emitted through the `metrics` facade. Installing a recorder
//! (Prometheus or otherwise) is left to the application; without one every
//! call here is a no-op.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `dynaroute_dispatch_total` | Counter | `route`, `outcome` |
//! | `dynaroute_dispatch_duration_seconds` | Histogram | `route` |
//! | `dynaroute_dispatch_in_flight` | Gauge | - |
//! | `dynaroute_validation_failures_total` | Counter | `stage` |
//! | `dynaroute_routes_compiled_total` | Counter | `schema` |

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Dispatch counter name.
pub const DISPATCH_TOTAL: &str = "dynaroute_dispatch_total";
/// Dispatch latency histogram name.
pub const DISPATCH_DURATION: &str = "dynaroute_dispatch_duration_seconds";
/// In-flight dispatch gauge name.
pub const DISPATCH_IN_FLIGHT: &str = "dynaroute_dispatch_in_flight";
/// Validation failure counter name.
pub const VALIDATION_FAILURES: &str = "dynaroute_validation_failures_total";
/// Compiled route counter name.
pub const ROUTES_COMPILED: &str = "dynaroute_routes_compiled_total";

/// Registers descriptions with the installed recorder.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(
        DISPATCH_TOTAL,
        "Requests dispatched through a compiled route, by outcome"
    );
    describe_histogram!(
        DISPATCH_DURATION,
        metrics::Unit::Seconds,
        "Time spent running a route pipeline"
    );
    describe_gauge!(DISPATCH_IN_FLIGHT, "Route pipelines currently running");
    describe_counter!(
        VALIDATION_FAILURES,
        "Requests rejected by header or body validation"
    );
    describe_counter!(ROUTES_COMPILED, "Routes produced by the schema compiler");
}

/// Records one finished dispatch.
///
/// `outcome` is one of `completed`, `halted` or `failed`.
pub fn record_dispatch(route: &str, outcome: &'static str, duration: Duration) {
    counter!(
        DISPATCH_TOTAL,
        "route" => route.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(DISPATCH_DURATION, "route" => route.to_string()).record(duration.as_secs_f64());
}

/// Records a request rejected by a validation stage.
pub fn record_validation_failure(stage: &'static str) {
    counter!(VALIDATION_FAILURES, "stage" => stage).increment(1);
}

/// Records one compiled route.
pub fn record_route_compiled(schema: &str) {
    counter!(ROUTES_COMPILED, "schema" => schema.to_string()).increment(1);
}

/// Holds the in-flight gauge up for as long as it lives.
///
/// Dropping it, including during unwinding, decrements the gauge.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the gauge and returns the guard.
    #[must_use]
    pub fn new() -> Self {
        gauge!(DISPATCH_IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(DISPATCH_IN_FLIGHT).decrement(1.0);
    }
}
