//! Public roadmap reads.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::graph::NodeTree;
use crate::web::errors::ApiResult;
use crate::web::extractors::{ApiPath, ApiQuery};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TreeQuery {
    pub max_depth: Option<usize>,
}

/// GET /roadmap/
pub async fn list_nodes(State(state): State<AppState>) -> ApiResult<Json<Vec<NodeTree>>> {
    Ok(Json(state.roadmap.all_nodes().await?))
}

/// GET /roadmap/directions
pub async fn list_directions(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.roadmap.directions().await?))
}

/// GET /roadmap/directions/:direction
pub async fn direction_nodes(
    State(state): State<AppState>,
    ApiPath(direction): ApiPath<String>,
) -> ApiResult<Json<Vec<NodeTree>>> {
    Ok(Json(state.roadmap.nodes_by_direction(&direction).await?))
}

/// GET /roadmap/tree/:direction?max_depth=
pub async fn direction_tree(
    State(state): State<AppState>,
    ApiPath(direction): ApiPath<String>,
    ApiQuery(query): ApiQuery<TreeQuery>,
) -> ApiResult<Json<Vec<NodeTree>>> {
    Ok(Json(state.roadmap.tree(&direction, query.max_depth).await?))
}

/// GET /roadmap/node/:id
pub async fn get_node(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<NodeTree>> {
    Ok(Json(state.roadmap.node(id).await?))
}
