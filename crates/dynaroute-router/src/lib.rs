//! Route pattern matching for Dynaroute.
//!
//! A compiled route carries a [`RoutePattern`] such as `/v1/devices/:id`.
//! Matching a request path splits both sides on `/` and compares them segment
//! by segment: placeholder segments (`:name`) capture the request segment,
//! literal segments must be identical.
//!
//! # Example
//!
//! ```rust
//! use dynaroute_router::{join_paths, RoutePattern};
//!
//! let pattern = RoutePattern::new(join_paths("/v1/devices", ":id"));
//! assert_eq!(pattern.as_str(), "/v1/devices/:id");
//!
//! let params = pattern.extract_params("/v1/devices/42").unwrap();
//! assert_eq!(params.get(":id"), Some("42"));
//! ```

mod params;
mod pattern;

pub use params::{Params, PLACEHOLDER_MARKER};
pub use pattern::{join_paths, PathMismatch, RoutePattern};
