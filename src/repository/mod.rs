//! Persistence contracts for nodes and connections.
//!
//! Repositories receive validated candidates (id zero) and commit them,
//! handing back the entity reconstructed with server-assigned values.
//! Uniqueness is enforced here so callers get a first-class conflict
//! error instead of a storage-specific one.

pub mod memory;

pub use memory::{InMemoryConnectionRepository, InMemoryNodeRepository};

use async_trait::async_trait;

use crate::domain::{Connection, Node};
use crate::error::Result;

/// Node storage keyed by id, unique over (host, port).
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Commit a candidate, assigning id and creation timestamp.
    async fn save(&self, candidate: Node) -> Result<Node>;

    /// Fetch a node by id.
    async fn find_by_id(&self, id: i64) -> Result<Node>;

    /// Fetch one page of nodes ordered by id, plus the total count.
    /// `page` is 1-based.
    async fn list(&self, page: u64, size: u64) -> Result<(Vec<Node>, u64)>;
}

/// Connection storage keyed by id, unique over (node, user).
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Commit a candidate, assigning id and creation timestamp.
    async fn save(&self, candidate: Connection) -> Result<Connection>;

    /// Fetch a connection by id.
    async fn find_by_id(&self, id: i64) -> Result<Connection>;

    /// All connections registered for a node, ordered by id.
    async fn find_by_node(&self, node_id: i64) -> Result<Vec<Connection>>;

    /// Persist a modified connection, re-checking uniqueness.
    async fn update(&self, connection: Connection) -> Result<Connection>;
}
