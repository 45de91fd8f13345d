//! Secret storage for connection key pairs.
//!
//! Key material never touches the relational state: it lives in an
//! external secret store addressed by the owning node's id. The
//! [`KeyStore`] trait is the seam services program against; the Vault
//! KV v2 implementation is the production backend.

pub mod error;
pub mod vault;

pub use error::{SecretError, SecretResult};
pub use vault::{VaultConfig, VaultKeyStore};

use async_trait::async_trait;

use crate::domain::ConnectionSshKeyPair;
use crate::error::Result;

/// Deferred key pair construction. The store invokes the factory only
/// once it is ready to persist, so generation cost is not paid when
/// the store itself is unusable.
pub type KeyPairFactory = Box<dyn FnOnce() -> Result<ConnectionSshKeyPair> + Send>;

/// Storage for per-node SSH key pairs.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Build a key pair via `create` and persist it under `owner_id`,
    /// returning the stored pair.
    async fn save(&self, owner_id: i64, create: KeyPairFactory) -> Result<ConnectionSshKeyPair>;

    /// Fetch the key pair stored under `owner_id`.
    async fn get(&self, owner_id: i64) -> Result<ConnectionSshKeyPair>;
}
