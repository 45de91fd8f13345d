//! Node entity: a remote host reachable over SSH.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The standard SSH port, accepted even though it sits below the
/// unprivileged range.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Lowest non-system port accepted for custom SSH daemons.
const MIN_CUSTOM_PORT: u16 = 1024;

/// A registered remote host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: i64,
    host: String,
    port: u16,
    created_at: DateTime<Utc>,
}

impl Node {
    /// Validate and build a new node candidate.
    ///
    /// The candidate carries a zero id until a repository commits it and
    /// reconstructs it via [`Node::with_generated`].
    pub fn create(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(Error::InvalidNode("host must not be empty".to_string()));
        }
        if !valid_port(port) {
            return Err(Error::InvalidNode(format!(
                "port {} is out of range: must be {} or {}-65535",
                port, DEFAULT_SSH_PORT, MIN_CUSTOM_PORT
            )));
        }
        Ok(Self {
            id: 0,
            host,
            port,
            created_at: Utc::now(),
        })
    }

    /// Reconstruct the node with values assigned by the repository.
    pub fn with_generated(&self, id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            host: self.host.clone(),
            port: self.port,
            created_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// `host:port` address usable for TCP connects.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether this node refers to the same endpoint as another.
    pub fn same_endpoint(&self, host: &str, port: u16) -> bool {
        self.host == host && self.port == port
    }
}

/// A port is valid if it is the standard SSH port or in the
/// non-system range.
fn valid_port(port: u16) -> bool {
    port == DEFAULT_SSH_PORT || port >= MIN_CUSTOM_PORT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_with_default_ssh_port() {
        let node = Node::create("db01.internal", 22).unwrap();
        assert_eq!(node.id(), 0);
        assert_eq!(node.host(), "db01.internal");
        assert_eq!(node.port(), 22);
    }

    #[test]
    fn test_create_with_custom_port() {
        for port in [1024, 2222, 65535] {
            let node = Node::create("db01.internal", port).unwrap();
            assert_eq!(node.port(), port);
        }
    }

    #[test]
    fn test_rejects_privileged_ports_other_than_22() {
        for port in [0, 1, 21, 23, 80, 1023] {
            let err = Node::create("db01.internal", port).unwrap_err();
            assert!(err.is_validation(), "port {} should be rejected", port);
        }
    }

    #[test]
    fn test_rejects_empty_host() {
        assert!(Node::create("", 22).is_err());
        assert!(Node::create("   ", 22).is_err());
    }

    #[test]
    fn test_with_generated_assigns_identity() {
        let candidate = Node::create("db01.internal", 2222).unwrap();
        let now = Utc::now();
        let node = candidate.with_generated(42, now);
        assert_eq!(node.id(), 42);
        assert_eq!(node.created_at(), now);
        assert_eq!(node.host(), candidate.host());
        assert_eq!(node.address(), "db01.internal:2222");
    }
}
