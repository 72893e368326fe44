//! Team and organisation aggregates.

use axum::extract::State;
use axum::Json;

use crate::services::{CorporateDashboard, ProfessionOut, TeamStats};
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

/// GET /team/stats
pub async fn team_stats(State(state): State<AppState>) -> ApiResult<Json<TeamStats>> {
    Ok(Json(state.team.stats().await?))
}

/// GET /team/professions
pub async fn professions(State(state): State<AppState>) -> ApiResult<Json<Vec<ProfessionOut>>> {
    Ok(Json(state.team.professions().await?))
}

/// GET /corporate/dashboard
pub async fn corporate_dashboard(
    State(state): State<AppState>,
) -> ApiResult<Json<CorporateDashboard>> {
    Ok(Json(state.corporate.dashboard().await?))
}
