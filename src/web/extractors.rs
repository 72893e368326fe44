//! # Custom Axum Extractors
//!
//! Resolve the bearer token of a request to a stored user, and wrap the stock
//! body, path and query extractors so their rejections become [`ApiError`]s.

use axum::async_trait;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use tracing::debug;

use crate::auth::JwtAuthenticator;
use crate::models::User;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

/// Any authenticated user
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authenticated user whose role is allowed to administer the roadmap
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::unauthorized("Missing credentials"))?;
        let token = JwtAuthenticator::extract_bearer_token(header)
            .map_err(|e| ApiError::unauthorized(e.to_string()))?;
        let user = state.auth.authenticate(token).await?;

        debug!(user_id = user.id, role = %user.role, "Authenticated request");
        Ok(Self(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !state.config.auth.is_admin_role(&user.role) {
            return Err(ApiError::forbidden("Admin role required"));
        }
        Ok(Self(user))
    }
}

/// JSON body whose rejection is reported as an [`ApiError`]
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejection is reported as an [`ApiError`]
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

/// Query string whose rejection is reported as an [`ApiError`]
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
