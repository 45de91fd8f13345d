//! Error types for the key pair secret store.

use thiserror::Error;

/// Result type for secret store operations.
pub type SecretResult<T> = std::result::Result<T, SecretError>;

/// Errors that can occur while reading or writing stored key pairs.
#[derive(Error, Debug)]
pub enum SecretError {
    /// No secret exists at the given path.
    #[error("Secret not found: {0}")]
    NotFound(String),

    /// The secret exists but a required field is missing.
    #[error("Key not found in secret: {0}")]
    KeyNotFound(String),

    /// The backend rejected our token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The token lacks permission for the path.
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// The store was misconfigured (missing address or token).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Could not reach the backend.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The backend is sealed or temporarily unavailable.
    #[error("Backend unavailable: {0}")]
    Sealed(String),

    /// The backend returned an unexpected error.
    #[error("Backend error: {message}")]
    Backend {
        message: String,
        status_code: Option<u16>,
    },

    /// A stored value did not have the expected shape.
    #[error("Invalid secret format: {0}")]
    InvalidFormat(String),

    /// HTTP transport failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl SecretError {
    /// Whether the error means the secret or one of its fields is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SecretError::NotFound(_) | SecretError::KeyNotFound(_))
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SecretError::Connection(_) | SecretError::Sealed(_) | SecretError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_covers_missing_fields() {
        assert!(SecretError::NotFound("nodes/1".into()).is_not_found());
        assert!(SecretError::KeyNotFound("private in nodes/1".into()).is_not_found());
        assert!(!SecretError::Authentication("bad token".into()).is_not_found());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SecretError::Connection("refused".into()).is_retryable());
        assert!(SecretError::Sealed("sealed".into()).is_retryable());
        assert!(!SecretError::NotFound("nodes/1".into()).is_retryable());
    }
}
