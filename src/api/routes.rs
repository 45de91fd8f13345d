//! API route configuration.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::state::AppState;

/// Create the main API router with all routes.
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1", v1_routes())
        .with_state(state)
}

fn v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Node inventory
        .route("/nodes", post(handlers::create_node).get(handlers::list_nodes))
        // Connection provisioning. GET interprets the path parameter
        // as a node id, PUT as a connection id.
        .route("/connections", post(handlers::create_connection))
        .route(
            "/connections/:id",
            get(handlers::list_connections).put(handlers::update_connection),
        )
        // Remote operations
        .route(
            "/remote/connections/:id/forward-public-key",
            post(handlers::forward_public_key),
        )
        .route(
            "/remote/connections/:id/ping",
            post(handlers::ping_connection),
        )
}
