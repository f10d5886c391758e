//! Unified error types for envelope building and data access.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for Baserepo.
///
/// Nothing in this crate retries on any of these; every variant is handed
/// straight back to the immediate caller.
#[derive(Error, Debug)]
pub enum BaseRepoError {
    /// A single requested record is absent.
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: String,
        id: String,
    },

    /// Malformed arguments, rejected before any data source call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A cursor fetch returned zero rows and the caller asked for a hard boundary.
    #[error("Cursor fetch returned no records")]
    EmptyResult,

    /// Raised by a transformer; carried through without added context.
    #[error(transparent)]
    Transformer(#[from] anyhow::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Encoding or decoding an envelope failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data source failure that fits no other variant.
    #[error("Data source error: {0}")]
    DataSource(String),
}

impl BaseRepoError {
    /// Returns the HTTP status code a handler layer would map this error to.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidArgument(_) => 400,
            Self::EmptyResult => 204,
            Self::Transformer(_)
            | Self::Configuration(_)
            | Self::Serialization(_)
            | Self::DataSource(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::EmptyResult => "EMPTY_RESULT",
            Self::Transformer(_) => "TRANSFORMER_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::DataSource(_) => "DATA_SOURCE_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<K: Into<String>, T: ToString>(resource_type: K, id: T) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument<T: Into<String>>(message: T) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<serde_json::Error> for BaseRepoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error body for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Request trace ID for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response from a `BaseRepoError`.
    #[must_use]
    pub fn from_error(error: &BaseRepoError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            trace_id: None,
        }
    }

    /// Sets the trace ID.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

impl From<&BaseRepoError> for ErrorResponse {
    fn from(error: &BaseRepoError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(BaseRepoError::not_found("users", 1).status_code(), 404);
        assert_eq!(BaseRepoError::invalid_argument("page must be >= 1").status_code(), 400);
        assert_eq!(BaseRepoError::EmptyResult.status_code(), 204);
        assert_eq!(BaseRepoError::DataSource("down".into()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(BaseRepoError::not_found("users", 1).error_code(), "NOT_FOUND");
        assert_eq!(BaseRepoError::invalid_argument("x").error_code(), "INVALID_ARGUMENT");
        assert_eq!(BaseRepoError::EmptyResult.error_code(), "EMPTY_RESULT");
        assert_eq!(
            BaseRepoError::from(anyhow::anyhow!("boom")).error_code(),
            "TRANSFORMER_ERROR"
        );
    }

    #[test]
    fn test_transformer_error_is_unchanged() {
        let err = BaseRepoError::from(anyhow::anyhow!("email column missing"));
        assert_eq!(err.to_string(), "email column missing");
    }

    #[test]
    fn test_not_found_message() {
        let err = BaseRepoError::not_found("users", 42);
        assert_eq!(err.to_string(), "Resource not found: users with id 42");
    }

    #[test]
    fn test_error_response_from_error() {
        let err = BaseRepoError::not_found("users", 1);
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "NOT_FOUND");
        assert!(!response.message.is_empty());
        assert!(response.trace_id.is_none());
    }

    #[test]
    fn test_error_response_with_trace_id() {
        let err = BaseRepoError::EmptyResult;
        let response = ErrorResponse::from(&err).with_trace_id("trace-123");
        assert_eq!(response.trace_id, Some("trace-123".to_string()));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = BaseRepoError::from(err);
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
