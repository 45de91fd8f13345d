//! In-memory repository implementations.
//!
//! Backing state is a [`DashMap`] per entity; writes additionally take
//! a mutex so the uniqueness check and the insert happen atomically.
//! Suitable for single-process deployments and tests.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::{ConnectionRepository, NodeRepository};
use crate::domain::{Connection, Node};
use crate::error::{Error, Result};

/// In-memory [`NodeRepository`].
#[derive(Default)]
pub struct InMemoryNodeRepository {
    nodes: DashMap<i64, Node>,
    next_id: AtomicI64,
    write_lock: Mutex<()>,
}

impl InMemoryNodeRepository {
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
            next_id: AtomicI64::new(0),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl NodeRepository for InMemoryNodeRepository {
    async fn save(&self, candidate: Node) -> Result<Node> {
        let _guard = self.write_lock.lock();

        let duplicate = self
            .nodes
            .iter()
            .any(|entry| entry.value().same_endpoint(candidate.host(), candidate.port()));
        if duplicate {
            return Err(Error::NodeAlreadyExists {
                host: candidate.host().to_string(),
                port: candidate.port(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let node = candidate.with_generated(id, Utc::now());
        self.nodes.insert(id, node.clone());
        Ok(node)
    }

    async fn find_by_id(&self, id: i64) -> Result<Node> {
        self.nodes
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::NodeNotFound(id))
    }

    async fn list(&self, page: u64, size: u64) -> Result<(Vec<Node>, u64)> {
        let mut all: Vec<Node> = self.nodes.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(Node::id);
        let total = all.len() as u64;

        // Saturate so absurd page numbers yield an empty page instead
        // of wrapping the offset.
        let offset = page.saturating_sub(1).saturating_mul(size);
        let items = all
            .into_iter()
            .skip(offset as usize)
            .take(size as usize)
            .collect();
        Ok((items, total))
    }
}

/// In-memory [`ConnectionRepository`].
#[derive(Default)]
pub struct InMemoryConnectionRepository {
    connections: DashMap<i64, Connection>,
    next_id: AtomicI64,
    write_lock: Mutex<()>,
}

impl InMemoryConnectionRepository {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicI64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    /// True if another connection (different id) would provision the
    /// same account.
    fn collides(&self, candidate: &Connection) -> bool {
        let fingerprint = candidate.fingerprint();
        self.connections.iter().any(|entry| {
            entry.value().id() != candidate.id() && entry.value().fingerprint() == fingerprint
        })
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn save(&self, candidate: Connection) -> Result<Connection> {
        let _guard = self.write_lock.lock();

        if self.collides(&candidate) {
            return Err(Error::ConnectionAlreadyExists {
                node_id: candidate.node_id(),
                user: candidate.user().to_string(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let connection = candidate.with_generated(id, Utc::now());
        self.connections.insert(id, connection.clone());
        Ok(connection)
    }

    async fn find_by_id(&self, id: i64) -> Result<Connection> {
        self.connections
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::ConnectionNotFound(id))
    }

    async fn find_by_node(&self, node_id: i64) -> Result<Vec<Connection>> {
        let mut matching: Vec<Connection> = self
            .connections
            .iter()
            .filter(|entry| entry.value().node_id() == node_id)
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by_key(Connection::id);
        Ok(matching)
    }

    async fn update(&self, connection: Connection) -> Result<Connection> {
        let _guard = self.write_lock.lock();

        if !self.connections.contains_key(&connection.id()) {
            return Err(Error::ConnectionNotFound(connection.id()));
        }
        if self.collides(&connection) {
            return Err(Error::ConnectionAlreadyExists {
                node_id: connection.node_id(),
                user: connection.user().to_string(),
            });
        }

        self.connections.insert(connection.id(), connection.clone());
        Ok(connection)
    }
}
