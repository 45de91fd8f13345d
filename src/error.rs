//! Domain-level error types shared across services.

use thiserror::Error;

use crate::secrets::SecretError;
use crate::ssh::SshError;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the inventory and provisioning services.
///
/// Variants map onto the HTTP taxonomy used by the API layer:
/// validation errors become 400, missing entities 404, uniqueness
/// violations 409, and everything else 500.
#[derive(Error, Debug)]
pub enum Error {
    /// A node failed domain validation.
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// A connection failed domain validation.
    #[error("Invalid connection: {0}")]
    InvalidConnection(String),

    /// Pagination or other request-level input was invalid.
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// No node with the requested id exists.
    #[error("Node {0} not found")]
    NodeNotFound(i64),

    /// No connection with the requested id exists.
    #[error("Connection {0} not found")]
    ConnectionNotFound(i64),

    /// A node with the same host and port already exists.
    #[error("Node {host}:{port} already exists")]
    NodeAlreadyExists { host: String, port: u16 },

    /// A connection for the same user already exists on the node.
    #[error("Connection for user '{user}' already exists on node {node_id}")]
    ConnectionAlreadyExists { node_id: i64, user: String },

    /// RSA key generation or PEM encoding/decoding failed.
    #[error("Key generation failed: {0}")]
    Keygen(String),

    /// The secret store failed; `context` names the stage that was running.
    #[error("{context}: {source}")]
    Secret {
        context: String,
        #[source]
        source: SecretError,
    },

    /// A remote SSH operation failed; `context` names the stage that was running.
    #[error("{context}: {source}")]
    Ssh {
        context: String,
        #[source]
        source: SshError,
    },
}

impl Error {
    /// Wrap a secret store error with the stage it occurred in.
    pub fn secret(context: impl Into<String>, source: SecretError) -> Self {
        Error::Secret {
            context: context.into(),
            source,
        }
    }

    /// Wrap an SSH error with the stage it occurred in.
    pub fn ssh(context: impl Into<String>, source: SshError) -> Self {
        Error::Ssh {
            context: context.into(),
            source,
        }
    }

    /// Whether this error represents a missing entity or secret.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NodeNotFound(_) | Error::ConnectionNotFound(_) => true,
            Error::Secret { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Whether this error represents a uniqueness violation.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::NodeAlreadyExists { .. } | Error::ConnectionAlreadyExists { .. }
        )
    }

    /// Whether this error represents invalid caller input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidNode(_) | Error::InvalidConnection(_) | Error::InvalidInput(_)
        )
    }
}
