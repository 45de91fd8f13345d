//! Remote key installation and reachability checks.

use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::keygen::Keygen;
use crate::repository::{ConnectionRepository, NodeRepository};
use crate::secrets::KeyStore;
use crate::ssh::{NodeSshConnection, SshAuth, SshExecutor};

/// Resolves a connection id into a live SSH session and runs remote
/// operations against it.
///
/// Every step qualifies its error with the stage it failed in, so a
/// `ForwardPublicKey` failure reads as "fetching keys for node 3: ..."
/// rather than a bare backend error.
pub struct RemoteAccessService {
    nodes: Arc<dyn NodeRepository>,
    connections: Arc<dyn ConnectionRepository>,
    keys: Arc<dyn KeyStore>,
    ssh: Arc<dyn SshExecutor>,
    keygen: Keygen,
}

impl RemoteAccessService {
    pub fn new(
        nodes: Arc<dyn NodeRepository>,
        connections: Arc<dyn ConnectionRepository>,
        keys: Arc<dyn KeyStore>,
        ssh: Arc<dyn SshExecutor>,
        keygen: Keygen,
    ) -> Self {
        Self {
            nodes,
            connections,
            keys,
            ssh,
            keygen,
        }
    }

    /// Install the stored public key into the connection's account on
    /// the remote node.
    ///
    /// The caller proves access with the account's password once; after
    /// this call the generated key pair becomes the ongoing auth
    /// mechanism.
    pub async fn forward_public_key(&self, connection_id: i64, password: &str) -> Result<()> {
        let connection = self.connections.find_by_id(connection_id).await?;
        let node = self.nodes.find_by_id(connection.node_id()).await?;
        let keys = self.keys.get(node.id()).await?;

        let target = NodeSshConnection::for_node(
            &node,
            connection.user(),
            SshAuth::Password(password.to_string()),
        );
        self.ssh
            .inject_public_key(&target, keys.public_key())
            .await
            .map_err(|e| {
                Error::ssh(
                    format!(
                        "installing public key for connection {} on node {}",
                        connection_id,
                        node.id()
                    ),
                    e,
                )
            })?;

        info!(
            connection_id = connection_id,
            node_id = node.id(),
            user = %connection.user(),
            "Forwarded public key"
        );
        Ok(())
    }

    /// Verify that key-based access works for a connection.
    ///
    /// Authenticates with the stored private key, decrypting the
    /// at-rest envelope first since SSH clients only understand
    /// plaintext PEM.
    pub async fn ping(&self, connection_id: i64) -> Result<()> {
        let connection = self.connections.find_by_id(connection_id).await?;
        let node = self.nodes.find_by_id(connection.node_id()).await?;
        let keys = self.keys.get(node.id()).await?;

        let private_pem = self.keygen.plaintext_private_pem(keys.private_pem())?;
        let target = NodeSshConnection::for_node(
            &node,
            connection.user(),
            SshAuth::PrivateKey(private_pem),
        );
        self.ssh.ping(&target).await.map_err(|e| {
            Error::ssh(
                format!(
                    "pinging node {} for connection {}",
                    node.id(),
                    connection_id
                ),
                e,
            )
        })
    }
}
