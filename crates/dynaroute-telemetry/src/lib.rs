//! Logging and metrics for Dynaroute.
//!
//! - [`logging`]: `tracing-subscriber` setup with JSON or pretty output
//! - [`metrics`]: dispatch counters and latency histograms via the `metrics` facade
//!
//! This crate has no dependency on the rest of the workspace; the pipeline
//! and schema crates call into it.
//!
//! # Example
//!
//! ```rust,no_run
//! use dynaroute_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production().with_service_name("devices")).unwrap();
//! dynaroute_telemetry::metrics::describe_metrics();
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use metrics::{record_dispatch, record_route_compiled, record_validation_failure, InFlightGuard};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
