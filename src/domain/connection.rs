//! Connection entity: a provisioned user account on a node.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The superuser account every node is assumed to expose.
pub const ROOT_USER: &str = "root";

/// POSIX-style account names: lowercase letter first, then up to 31
/// lowercase letters, digits, underscores or hyphens.
static USER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_-]{0,31}$").unwrap());

/// A user account on a node for which an SSH key pair is provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    id: i64,
    node_id: i64,
    user: String,
    created_at: DateTime<Utc>,
}

impl Connection {
    /// Validate and build a new connection candidate for `node_id`.
    pub fn create(node_id: i64, user: impl Into<String>) -> Result<Self> {
        let user = user.into();
        if !USER_PATTERN.is_match(&user) {
            return Err(Error::InvalidConnection(format!(
                "user '{}' is not a valid account name",
                user
            )));
        }
        Ok(Self {
            id: 0,
            node_id,
            user,
            created_at: Utc::now(),
        })
    }

    /// Connection for the root account of `node_id`. Used when the
    /// service needs superuser access to install keys for other users.
    pub fn root(node_id: i64) -> Self {
        Self {
            id: 0,
            node_id,
            user: ROOT_USER.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Reconstruct the connection with values assigned by the repository.
    pub fn with_generated(&self, id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            node_id: self.node_id,
            user: self.user.clone(),
            created_at,
        }
    }

    /// Replace the user name, re-running validation.
    pub fn update_user(&self, user: impl Into<String>) -> Result<Self> {
        let user = user.into();
        if !USER_PATTERN.is_match(&user) {
            return Err(Error::InvalidConnection(format!(
                "user '{}' is not a valid account name",
                user
            )));
        }
        Ok(Self {
            id: self.id,
            node_id: self.node_id,
            user,
            created_at: self.created_at,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn node_id(&self) -> i64 {
        self.node_id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Digest over the (node, user) pair. Two connections collide
    /// exactly when they would provision the same account.
    pub fn fingerprint(&self) -> String {
        format!("{:x}", md5::compute(format!("{}:{}", self.node_id, self.user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_accepts_valid_users() {
        for user in ["deploy", "a", "web-runner", "svc_backup", "u2"] {
            let conn = Connection::create(1, user).unwrap();
            assert_eq!(conn.user(), user);
            assert_eq!(conn.node_id(), 1);
            assert_eq!(conn.id(), 0);
        }
    }

    #[test]
    fn test_create_rejects_invalid_users() {
        for user in [
            "",
            "Deploy",
            "1deploy",
            "_deploy",
            "-deploy",
            "sp ace",
            "über",
            "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", // 33 chars
        ] {
            assert!(
                Connection::create(1, user).is_err(),
                "user '{}' should be rejected",
                user
            );
        }
    }

    #[test]
    fn test_user_length_boundary() {
        let max = format!("a{}", "b".repeat(31));
        assert_eq!(max.len(), 32);
        assert!(Connection::create(1, max.as_str()).is_ok());
        let over = format!("a{}", "b".repeat(32));
        assert!(Connection::create(1, over.as_str()).is_err());
    }

    #[test]
    fn test_root_connection() {
        let conn = Connection::root(9);
        assert_eq!(conn.user(), ROOT_USER);
        assert_eq!(conn.node_id(), 9);
    }

    #[test]
    fn test_fingerprint_distinguishes_accounts() {
        let a = Connection::create(1, "deploy").unwrap();
        let b = Connection::create(1, "backup").unwrap();
        let c = Connection::create(2, "deploy").unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        // Same account, same fingerprint regardless of timestamps.
        let a2 = Connection::create(1, "deploy").unwrap();
        assert_eq!(a.fingerprint(), a2.fingerprint());
    }

    #[test]
    fn test_update_user_revalidates() {
        let conn = Connection::create(1, "deploy").unwrap().with_generated(5, Utc::now());
        let updated = conn.update_user("backup").unwrap();
        assert_eq!(updated.id(), 5);
        assert_eq!(updated.user(), "backup");
        assert_eq!(updated.created_at(), conn.created_at());
        assert!(conn.update_user("Bad User").is_err());
    }
}
