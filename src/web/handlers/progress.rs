//! Learner progress endpoints.

use axum::extract::State;
use axum::Json;

use crate::models::Progress;
use crate::services::{ProgressUpdate, ProgressUpdateOut};
use crate::web::errors::ApiResult;
use crate::web::extractors::{ApiJson, CurrentUser};
use crate::web::state::AppState;

/// POST /progress/update
pub async fn update_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(update): ApiJson<ProgressUpdate>,
) -> ApiResult<Json<ProgressUpdateOut>> {
    Ok(Json(state.progress.update(&user, update).await?))
}

/// GET /progress/mine
pub async fn my_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Progress>>> {
    Ok(Json(state.progress.mine(&user).await?))
}
