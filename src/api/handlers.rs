//! API route handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::error::ApiResult;
use super::state::AppState;
use super::types::*;

// ============================================================================
// Health
// ============================================================================

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::version().to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

// ============================================================================
// Nodes
// ============================================================================

/// `POST /nodes` - register a node.
pub async fn create_node(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateNodeRequest>,
) -> ApiResult<(StatusCode, Json<NodeResponse>)> {
    let node = state.nodes.create(&req.host, req.port).await?;
    Ok((StatusCode::CREATED, Json(NodeResponse::from(&node))))
}

/// `GET /nodes` - paginated inventory listing.
pub async fn list_nodes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<NodeResponse>>> {
    let (nodes, total) = state.nodes.list(query.page, query.size).await?;
    let items = nodes.iter().map(NodeResponse::from).collect();
    Ok(Json(Paginated::new(items, total, query.page, query.size)))
}

// ============================================================================
// Connections
// ============================================================================

/// `POST /connections` - provision a connection and its key pair.
pub async fn create_connection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateConnectionRequest>,
) -> ApiResult<(StatusCode, Json<ConnectionCreatedResponse>)> {
    let provisioned = state.connections.create(req.node_id, &req.user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ConnectionCreatedResponse::from(&provisioned)),
    ))
}

/// `GET /connections/{nodeId}` - connections registered for a node.
pub async fn list_connections(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<i64>,
) -> ApiResult<Json<Vec<ConnectionResponse>>> {
    let connections = state.connections.list_for_node(node_id).await?;
    Ok(Json(connections.iter().map(ConnectionResponse::from).collect()))
}

/// `PUT /connections/{id}` - rename the provisioned account.
pub async fn update_connection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateConnectionRequest>,
) -> ApiResult<StatusCode> {
    state.connections.update_user(id, &req.user).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Remote operations
// ============================================================================

/// `POST /remote/connections/{id}/forward-public-key` - install the
/// stored public key on the node.
pub async fn forward_public_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ForwardPublicKeyRequest>,
) -> ApiResult<StatusCode> {
    state.remote.forward_public_key(id, &req.password).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /remote/connections/{id}/ping` - verify key-based access.
pub async fn ping_connection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.remote.ping(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
