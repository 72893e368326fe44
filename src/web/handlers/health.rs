//! # Health Check Handlers
//!
//! Liveness and store connectivity endpoints for monitoring and load balancing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error};

use crate::constants::system;
use crate::web::state::AppState;

/// Root response: GET /
#[derive(Debug, Serialize)]
pub struct RootResponse {
    status: String,
    name: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
    timestamp: String,
    checks: BTreeMap<String, HealthCheck>,
}

/// Individual health check result
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    status: String,
    message: Option<String>,
    duration_ms: u64,
}

impl HealthCheck {
    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        name: system::DISPLAY_NAME.to_string(),
    })
}

/// Store connectivity check: GET /health
///
/// Answers 503 with the same body when the store cannot be reached.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    debug!("Performing health check");

    let mut checks = BTreeMap::new();
    checks.insert("database".to_string(), check_store_health(&state).await);
    let healthy = checks.values().all(HealthCheck::is_healthy);

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        service: system::SERVICE_NAME.to_string(),
        version: system::VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

async fn check_store_health(state: &AppState) -> HealthCheck {
    let start = Instant::now();
    let result = state.store.ping().await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => HealthCheck {
            status: "healthy".to_string(),
            message: None,
            duration_ms,
        },
        Err(e) => {
            error!(error = %e, "Store health check failed");
            HealthCheck {
                status: "unhealthy".to_string(),
                message: Some("Store connection failed".to_string()),
                duration_ms,
            }
        }
    }
}
