//! Error types for request handling.
//!
//! [`RouteError`] is the single error type that flows through a compiled
//! route: request guards, validation stages, factories and custom handlers all
//! report failures with it. Every variant maps to an HTTP status code and to a
//! JSON error body of the form `{"status": 403, "message": "Forbidden"}`.

use dynaroute_router::PathMismatch;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`RouteError`].
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors raised while serving a request.
///
/// # Example
///
/// ```
/// use dynaroute_core::RouteError;
/// use http::StatusCode;
///
/// let err = RouteError::forbidden("wrong method");
/// assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
/// assert_eq!(err.to_body().message, "Forbidden");
/// ```
#[derive(Error, Debug)]
pub enum RouteError {
    /// The request does not fit the route (method, content type or path).
    #[error("Forbidden: {reason}")]
    Forbidden {
        /// Why the request was rejected. Logged, never sent to clients.
        reason: String,
    },

    /// The request body failed validation or could not be parsed.
    #[error("InvalidRequestPayload: {message}")]
    InvalidRequestPayload {
        /// Human-readable description.
        message: String,
        /// Structured validation details.
        details: Option<serde_json::Value>,
    },

    /// Required request headers are missing or malformed.
    #[error("IncompleteRequestHeaders: {message}")]
    IncompleteRequestHeaders {
        /// Human-readable description.
        message: String,
    },

    /// No route matches the request.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable description.
        message: String,
    },

    /// A factory method has no implementation.
    #[error("NeedFunctionOverride: {operation} is not implemented")]
    NotImplemented {
        /// The factory operation that was called.
        operation: String,
    },

    /// A factory reported a failure.
    #[error("{message}")]
    Factory {
        /// Status code to answer with.
        status: StatusCode,
        /// Message sent to clients.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Unexpected failure inside a step.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable description. Logged, never sent to clients.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl RouteError {
    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Creates an invalid payload error.
    #[must_use]
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidRequestPayload {
            message: message.into(),
            details: None,
        }
    }

    /// Creates an invalid payload error with structured details.
    #[must_use]
    pub fn invalid_payload_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::InvalidRequestPayload {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Creates an incomplete headers error.
    #[must_use]
    pub fn incomplete_headers(message: impl Into<String>) -> Self {
        Self::IncompleteRequestHeaders {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a not implemented error for a factory operation.
    #[must_use]
    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
        }
    }

    /// Creates a factory error with an explicit status.
    #[must_use]
    pub fn factory(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Factory {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a factory error wrapping a source error, answered with 500.
    pub fn factory_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Factory {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::InvalidRequestPayload { .. } | Self::IncompleteRequestHeaders { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::NotImplemented { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Factory { status, .. } => *status,
        }
    }

    /// Returns the message exposed to clients.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Forbidden { .. } => "Forbidden".to_string(),
            Self::InvalidRequestPayload { .. } => "InvalidRequestPayload".to_string(),
            Self::IncompleteRequestHeaders { .. } => "IncompleteRequestHeaders".to_string(),
            Self::NotFound { .. } => "NotFound".to_string(),
            Self::NotImplemented { .. } => "NeedFunctionOverride".to_string(),
            Self::Factory { message, .. } => message.clone(),
            Self::Internal { .. } => "InternalServerError".to_string(),
        }
    }

    /// Converts this error into the JSON error body.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let details = match self {
            Self::InvalidRequestPayload { details, .. } => details.clone(),
            _ => None,
        };

        ErrorBody {
            status: self.status_code().as_u16(),
            message: self.public_message(),
            details,
        }
    }

    /// Returns true for errors caused by the client.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<PathMismatch> for RouteError {
    fn from(mismatch: PathMismatch) -> Self {
        Self::forbidden(mismatch.to_string())
    }
}

/// JSON error body written for failed requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code.
    pub status: u16,
    /// Client-facing message.
    pub message: String,
    /// Additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
