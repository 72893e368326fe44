//! # Roadmap Administration Handlers
//!
//! Node and blocking-relation management. Every handler requires an
//! [`AdminUser`]; graph rules are enforced by [`crate::services::RoadmapService`].

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::graph::NodeTree;
use crate::models::NodeBlock;
use crate::services::{AvailabilityOut, BlockInput, NodeInput};
use crate::web::errors::ApiResult;
use crate::web::extractors::{AdminUser, ApiJson, ApiPath};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NodeIdsRequest {
    pub node_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// GET /admin/roadmap/nodes
pub async fn list_nodes(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<NodeTree>>> {
    Ok(Json(state.roadmap.all_nodes().await?))
}

/// POST /admin/roadmap/nodes/by-ids
pub async fn nodes_by_ids(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(request): ApiJson<NodeIdsRequest>,
) -> ApiResult<Json<Vec<NodeTree>>> {
    Ok(Json(state.roadmap.nodes_by_ids(&request.node_ids).await?))
}

/// POST /admin/roadmap/nodes
pub async fn create_node(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(input): ApiJson<NodeInput>,
) -> ApiResult<Json<NodeTree>> {
    let node = state.roadmap.create_node(input).await?;
    info!(admin_id = admin.id, node_id = node.node.id, "Node created");
    Ok(Json(node))
}

/// PUT /admin/roadmap/nodes/:id
pub async fn update_node(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<NodeInput>,
) -> ApiResult<Json<NodeTree>> {
    let node = state.roadmap.update_node(id, input).await?;
    info!(admin_id = admin.id, node_id = id, "Node updated");
    Ok(Json(node))
}

/// DELETE /admin/roadmap/nodes/:id
pub async fn delete_node(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.roadmap.delete_node(id).await?;
    info!(admin_id = admin.id, node_id = id, "Node deleted");
    Ok(MessageResponse::new("Node deleted successfully"))
}

/// GET /admin/roadmap/nodes/:id/dependencies
pub async fn node_dependencies(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<NodeTree>>> {
    Ok(Json(state.roadmap.node_dependencies(id).await?))
}

/// GET /admin/roadmap/nodes/:id/availability/:user_id
pub async fn node_availability(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath((id, user_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<AvailabilityOut>> {
    Ok(Json(state.roadmap.node_availability(id, user_id).await?))
}

/// POST /admin/roadmap/blocks
pub async fn create_block(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(input): ApiJson<BlockInput>,
) -> ApiResult<Json<NodeBlock>> {
    let block = state.roadmap.create_block(input).await?;
    info!(admin_id = admin.id, block_id = block.id, "Block created");
    Ok(Json(block))
}

/// DELETE /admin/roadmap/blocks/:id
pub async fn delete_block(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.roadmap.delete_block(id).await?;
    info!(admin_id = admin.id, block_id = id, "Block deleted");
    Ok(MessageResponse::new("Block deleted successfully"))
}
