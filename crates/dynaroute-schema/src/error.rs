//! Schema compilation errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for schema loading and compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors raised while loading or compiling a schema.
///
/// Every variant is fatal to registration: a route that fails to compile is
/// never served.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The schema definition does not have the expected shape.
    #[error("invalid schema definition at '{field}': {reason}")]
    SchemaValidation {
        /// Path of the offending field, e.g. `routes.get.method`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The route's operation kind has no HTTP method.
    #[error("invalid operation kind '{kind}'")]
    InvalidOperationKind {
        /// The rejected kind.
        kind: String,
    },

    /// The route id is not in the schema's route map.
    #[error("schema '{schema}' has no route '{route}'")]
    UnknownRoute {
        /// The schema that was searched.
        schema: String,
        /// The missing route id.
        route: String,
    },

    /// The catalog has no schema with this id.
    #[error("unknown schema '{schema}'")]
    UnknownSchema {
        /// The missing schema id.
        schema: String,
    },

    /// A schema document could not be read from disk.
    #[error("failed to read schema document {}: {source}", path.display())]
    DocumentRead {
        /// The document path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    /// Creates a shape error for `field`.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
