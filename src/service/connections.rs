//! Connection provisioning service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::Connection;
use crate::error::Result;
use crate::keygen::Keygen;
use crate::repository::{ConnectionRepository, NodeRepository};
use crate::secrets::KeyStore;

/// A freshly created connection together with the public half of its
/// generated key pair. The private half never leaves the secret store.
#[derive(Debug, Clone)]
pub struct ProvisionedConnection {
    pub connection: Connection,
    pub public_key: String,
}

/// Creates and maintains connections and their key material.
pub struct ConnectionService {
    nodes: Arc<dyn NodeRepository>,
    connections: Arc<dyn ConnectionRepository>,
    keys: Arc<dyn KeyStore>,
    keygen: Keygen,
}

impl ConnectionService {
    pub fn new(
        nodes: Arc<dyn NodeRepository>,
        connections: Arc<dyn ConnectionRepository>,
        keys: Arc<dyn KeyStore>,
        keygen: Keygen,
    ) -> Self {
        Self {
            nodes,
            connections,
            keys,
            keygen,
        }
    }

    /// Create a connection on `node_id` and provision its key pair.
    ///
    /// The connection row is committed before the key pair is written
    /// to the secret store. If the secret write fails the row stays in
    /// place; the error names the stage so an operator can retry or
    /// clean up.
    pub async fn create(&self, node_id: i64, user: &str) -> Result<ProvisionedConnection> {
        let candidate = Connection::create(node_id, user)?;
        self.nodes.find_by_id(node_id).await?;

        let connection = self.connections.save(candidate).await?;

        let keygen = self.keygen.clone();
        let pair = self
            .keys
            .save(node_id, Box::new(move || keygen.generate_pair()))
            .await
            .inspect_err(|_| {
                warn!(
                    connection_id = connection.id(),
                    node_id = node_id,
                    "Connection row committed but key pair storage failed"
                );
            })?;

        info!(
            connection_id = connection.id(),
            node_id = node_id,
            user = user,
            "Provisioned connection"
        );
        Ok(ProvisionedConnection {
            connection,
            public_key: pair.public_key().to_string(),
        })
    }

    pub async fn get(&self, id: i64) -> Result<Connection> {
        self.connections.find_by_id(id).await
    }

    /// All connections registered for a node.
    pub async fn list_for_node(&self, node_id: i64) -> Result<Vec<Connection>> {
        self.nodes.find_by_id(node_id).await?;
        self.connections.find_by_node(node_id).await
    }

    /// Rename the account a connection provisions.
    pub async fn update_user(&self, id: i64, user: &str) -> Result<Connection> {
        let current = self.connections.find_by_id(id).await?;
        let updated = current.update_user(user)?;
        let connection = self.connections.update(updated).await?;
        info!(connection_id = id, user = user, "Updated connection user");
        Ok(connection)
    }
}
