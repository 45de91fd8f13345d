//! API error types and response formatting.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::error::Error;

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// API error type with HTTP status code mapping.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for machine parsing.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_validation() {
            ApiError::BadRequest(err.to_string())
        } else if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else if err.is_conflict() {
            ApiError::Conflict(err.to_string())
        } else {
            // Backend details go to the log, not the response body.
            error!(error = %err, "Internal error while handling request");
            ApiError::Internal("operation failed".to_string())
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for machine parsing
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretError;
    use crate::ssh::SshError;

    #[test]
    fn test_taxonomy_mapping() {
        let cases = [
            (Error::InvalidNode("bad port".into()), StatusCode::BAD_REQUEST),
            (Error::InvalidConnection("bad user".into()), StatusCode::BAD_REQUEST),
            (Error::InvalidInput("bad page".into()), StatusCode::BAD_REQUEST),
            (Error::NodeNotFound(1), StatusCode::NOT_FOUND),
            (Error::ConnectionNotFound(1), StatusCode::NOT_FOUND),
            (
                Error::NodeAlreadyExists { host: "h".into(), port: 22 },
                StatusCode::CONFLICT,
            ),
            (
                Error::ConnectionAlreadyExists { node_id: 1, user: "u".into() },
                StatusCode::CONFLICT,
            ),
            (Error::Keygen("rng".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_missing_secret_maps_to_not_found() {
        let err = Error::secret(
            "reading key pair for node 1",
            SecretError::NotFound("nodes/1".into()),
        );
        assert_eq!(ApiError::from(err).status_code(), StatusCode::NOT_FOUND);

        let err = Error::secret(
            "reading key pair for node 1",
            SecretError::KeyNotFound("private in nodes/1".into()),
        );
        assert_eq!(ApiError::from(err).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_errors_do_not_leak_detail() {
        let err = Error::ssh(
            "installing public key for connection 1 on node 1",
            SshError::AuthenticationFailed("password rejected for root".into()),
        );
        let api_err = ApiError::from(err);
        assert_eq!(api_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api_err.to_string().contains("root"));
    }
}
