//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::service::{ConnectionService, NodeService, RemoteAccessService};

/// Shared application state.
pub struct AppState {
    /// Node inventory operations
    pub nodes: NodeService,
    /// Connection provisioning operations
    pub connections: ConnectionService,
    /// Remote key installation and reachability checks
    pub remote: RemoteAccessService,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        nodes: NodeService,
        connections: ConnectionService,
        remote: RemoteAccessService,
    ) -> Arc<Self> {
        Arc::new(Self {
            nodes,
            connections,
            remote,
            start_time: Instant::now(),
        })
    }

    /// Seconds since the server started.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
