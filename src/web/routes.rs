//! # Web API Route Definitions
//!
//! Routes are grouped by audience. Authentication is enforced per handler
//! through the [`crate::web::extractors`] types, so the groups only organise
//! paths.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Service root and health probe
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
}

/// Registration, login and the current user
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// Public roadmap reads
pub fn roadmap_routes() -> Router<AppState> {
    Router::new()
        .route("/roadmap/", get(handlers::roadmap::list_nodes))
        .route("/roadmap/directions", get(handlers::roadmap::list_directions))
        .route(
            "/roadmap/directions/:direction",
            get(handlers::roadmap::direction_nodes),
        )
        .route(
            "/roadmap/tree/:direction",
            get(handlers::roadmap::direction_tree),
        )
        .route("/roadmap/node/:id", get(handlers::roadmap::get_node))
}

/// Learner progress, aggregates and settings
pub fn learner_routes() -> Router<AppState> {
    Router::new()
        .route("/progress/update", post(handlers::progress::update_progress))
        .route("/progress/mine", get(handlers::progress::my_progress))
        .route("/team/stats", get(handlers::team::team_stats))
        .route("/team/professions", get(handlers::team::professions))
        .route(
            "/corporate/dashboard",
            get(handlers::team::corporate_dashboard),
        )
        .route(
            "/user/settings",
            get(handlers::user::get_settings).post(handlers::user::update_settings),
        )
}

/// Roadmap administration, prefixed with `/admin/roadmap`
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/nodes",
            get(handlers::admin::list_nodes).post(handlers::admin::create_node),
        )
        .route("/nodes/by-ids", post(handlers::admin::nodes_by_ids))
        .route(
            "/nodes/:id",
            put(handlers::admin::update_node).delete(handlers::admin::delete_node),
        )
        .route(
            "/nodes/:id/dependencies",
            get(handlers::admin::node_dependencies),
        )
        .route(
            "/nodes/:id/availability/:user_id",
            get(handlers::admin::node_availability),
        )
        .route("/blocks", post(handlers::admin::create_block))
        .route("/blocks/:id", delete(handlers::admin::delete_block))
}
