//! Registration, login and the current user.

use axum::extract::State;
use axum::Json;

use crate::services::{LoginRequest, RegisterRequest, Token, UserOut};
use crate::web::errors::ApiResult;
use crate::web::extractors::{ApiJson, CurrentUser};
use crate::web::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<Json<UserOut>> {
    let user = state.auth.register(request).await?;
    Ok(Json(UserOut::from(&user)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<Token>> {
    Ok(Json(state.auth.login(request).await?))
}

/// GET /auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserOut> {
    Json(UserOut::from(&user))
}
