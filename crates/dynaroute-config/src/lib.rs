//! Typed configuration for Dynaroute services.
//!
//! This crate loads the settings a Dynaroute service needs before it mounts
//! its schemas:
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`DynarouteConfig`] has two sections:
//!
//! - [`ServerSection`] - which schemas to serve and where the catalog lives
//! - [`LoggingSection`] - log level, format and record decoration
//!
//! # Example
//!
//! ```no_run
//! use dynaroute_config::ConfigLoader;
//!
//! # fn main() -> Result<(), dynaroute_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("dynaroute.toml")?
//!     .with_env_prefix("DYNAROUTE")
//!     .load()?;
//!
//! for id in &config.server.schemas {
//!     println!("serving schema {id}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! service_name = "devices-api"
//! schema_file = "schemas.json"
//! schemas = ["devices", "users"]
//!
//! [logging]
//! enabled = true
//! level = "info,dynaroute_pipeline=debug"
//! format = "json"
//! include_location = false
//! thread_ids = false
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with variables of the form `PREFIX__SECTION__KEY`:
//!
//! - `DYNAROUTE__SERVER__SCHEMAS=devices,users`
//! - `DYNAROUTE__SERVER__SCHEMA_FILE=/etc/dynaroute/schemas.toml`
//! - `DYNAROUTE__LOGGING__LEVEL=debug`
//! - `DYNAROUTE__LOGGING__FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
