use axum::http::StatusCode;

use crate::common::TestApp;

#[tokio::test]
async fn test_root_reports_service_name() {
    let app = TestApp::new();
    let response = app.get("/", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["name"], "Gamified Roadmap Platform");
}

#[tokio::test]
async fn test_health_checks_store() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["service"], "gamified-roadmap-backend");
    assert_eq!(response.body["checks"]["database"]["status"], "healthy");
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn test_every_response_carries_request_id() {
    let app = TestApp::new();
    let first = app.get("/", None).await;
    let second = app.get("/roadmap/node/999", None).await;

    let first_id = first.headers["x-request-id"].to_str().unwrap().to_string();
    let second_id = second.headers["x-request-id"].to_str().unwrap().to_string();
    assert_eq!(first_id.len(), 36);
    assert_ne!(first_id, second_id);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new();
    let response = app.get("/nope", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
