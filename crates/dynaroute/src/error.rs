//! Errors raised while building a route table.

use dynaroute_config::ConfigError;
use dynaroute_schema::CompileError;
use thiserror::Error;

/// Errors raised while mounting schemas.
///
/// Per-request failures never surface here; they are answered with an error
/// body by [`ServedRoute::handle`](crate::ServedRoute::handle).
#[derive(Debug, Error)]
pub enum ServeError {
    /// A schema or route failed to compile, or its document failed to load.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configuration names no schema catalog.
    #[error("no schema catalog configured, set server.schema_file")]
    MissingCatalog,
}

/// Result type for mounting schemas.
pub type ServeResult<T> = Result<T, ServeError>;
