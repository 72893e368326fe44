//! Per-user settings.

use axum::extract::State;
use axum::Json;

use crate::services::{UserSettings, UserSettingsUpdate};
use crate::web::errors::ApiResult;
use crate::web::extractors::{ApiJson, CurrentUser};
use crate::web::state::AppState;

/// GET /user/settings
pub async fn get_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<UserSettings> {
    Json(state.settings.get(&user))
}

/// POST /user/settings
pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(update): ApiJson<UserSettingsUpdate>,
) -> ApiResult<Json<UserSettings>> {
    Ok(Json(state.settings.update(&user, update).await?))
}
