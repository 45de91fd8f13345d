//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Connection, Node};
use crate::service::ProvisionedConnection;

// ============================================================================
// Nodes
// ============================================================================

/// Request to register a node.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateNodeRequest {
    /// Hostname or IP address
    pub host: String,
    /// SSH port (22 or 1024-65535)
    pub port: u16,
}

/// One node in API responses.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse {
    pub id: i64,
    pub host: String,
    pub port: u16,
    pub created_at: DateTime<Utc>,
}

impl From<&Node> for NodeResponse {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id(),
            host: node.host().to_string(),
            port: node.port(),
            created_at: node.created_at(),
        }
    }
}

/// Pagination query parameters.
#[derive(Debug, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    20
}

/// Paginated listing envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, size: u64) -> Self {
        let pages = total.div_ceil(size.max(1));
        Self {
            items,
            total,
            page,
            size,
            pages,
        }
    }
}

// ============================================================================
// Connections
// ============================================================================

/// Request to provision a connection on a node.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectionRequest {
    pub node_id: i64,
    pub user: String,
}

/// Request to rename a connection's account.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateConnectionRequest {
    pub user: String,
}

/// One connection in API responses.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponse {
    pub id: i64,
    pub node_id: i64,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Connection> for ConnectionResponse {
    fn from(connection: &Connection) -> Self {
        Self {
            id: connection.id(),
            node_id: connection.node_id(),
            user: connection.user().to_string(),
            created_at: connection.created_at(),
        }
    }
}

/// Response to a successful provisioning. Carries the public key so
/// the caller can distribute it; the private key stays in the store.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionCreatedResponse {
    pub id: i64,
    pub node_id: i64,
    pub user: String,
    pub public_key: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ProvisionedConnection> for ConnectionCreatedResponse {
    fn from(provisioned: &ProvisionedConnection) -> Self {
        Self {
            id: provisioned.connection.id(),
            node_id: provisioned.connection.node_id(),
            user: provisioned.connection.user().to_string(),
            public_key: provisioned.public_key.clone(),
            created_at: provisioned.connection.created_at(),
        }
    }
}

// ============================================================================
// Remote operations
// ============================================================================

/// Request to install a connection's public key on its node.
#[derive(Debug, Serialize, Deserialize)]
pub struct ForwardPublicKeyRequest {
    /// Password for the target account, used for this one handshake
    pub password: String,
}

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_page_count() {
        let p = Paginated::new(vec![1, 2], 5, 1, 2);
        assert_eq!(p.pages, 3);
        let p = Paginated::new(Vec::<i32>::new(), 0, 1, 20);
        assert_eq!(p.pages, 0);
        let p = Paginated::new(vec![1], 20, 1, 20);
        assert_eq!(p.pages, 1);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let req: CreateConnectionRequest =
            serde_json::from_str(r#"{"nodeId": 3, "user": "deploy"}"#).unwrap();
        assert_eq!(req.node_id, 3);

        let conn = Connection::create(3, "deploy")
            .unwrap()
            .with_generated(1, Utc::now());
        let body = serde_json::to_value(ConnectionResponse::from(&conn)).unwrap();
        assert!(body.get("nodeId").is_some());
        assert!(body.get("createdAt").is_some());
    }
}
