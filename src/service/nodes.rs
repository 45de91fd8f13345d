//! Node inventory service.

use std::sync::Arc;

use tracing::info;

use super::check_pagination;
use crate::domain::Node;
use crate::error::Result;
use crate::repository::NodeRepository;

/// CRUD-style operations over the node inventory.
pub struct NodeService {
    nodes: Arc<dyn NodeRepository>,
}

impl NodeService {
    pub fn new(nodes: Arc<dyn NodeRepository>) -> Self {
        Self { nodes }
    }

    /// Validate and register a new node.
    pub async fn create(&self, host: &str, port: u16) -> Result<Node> {
        let candidate = Node::create(host, port)?;
        let node = self.nodes.save(candidate).await?;
        info!(node_id = node.id(), host = %node.host(), port = node.port(), "Registered node");
        Ok(node)
    }

    pub async fn get(&self, id: i64) -> Result<Node> {
        self.nodes.find_by_id(id).await
    }

    /// One page of the inventory, 1-based, plus the total count.
    pub async fn list(&self, page: u64, size: u64) -> Result<(Vec<Node>, u64)> {
        check_pagination(page, size)?;
        self.nodes.list(page, size).await
    }
}
