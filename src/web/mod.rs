//! # Web API Module
//!
//! Axum-based REST API for the roadmap platform.
//!
//! ## Core Components
//!
//! - [`routes`] - HTTP route definitions grouped by audience
//! - [`handlers`] - Request handlers for each endpoint group
//! - [`extractors`] - Bearer-token user resolution and admin role checks
//! - [`middleware`] - Request ids and CORS policy
//! - [`errors`] - `{detail, code}` error responses
//! - [`state`] - Shared application state

pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Create the Axum application with all routes and middleware
pub fn create_app(app_state: AppState) -> Router {
    let request_timeout = app_state.config.web.request_timeout();
    let cors = middleware::create_cors_layer(&app_state.config.web);

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::auth_routes())
        .merge(routes::roadmap_routes())
        .merge(routes::learner_routes())
        .nest("/admin/roadmap", routes::admin_routes())
        .layer(axum::middleware::from_fn(
            middleware::request_id::add_request_id,
        ))
        // Timed out requests answer 408
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
