use axum::http::StatusCode;
use serde_json::json;

use crate::common::{TestApp, PASSWORD};

#[tokio::test]
async fn test_register_login_me() {
    let app = TestApp::new();
    let response = app
        .post(
            "/auth/register",
            None,
            json!({"email": " New.User@Dev.com ", "password": PASSWORD}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], "new.user@dev.com");
    assert_eq!(response.body["role"], "intern");
    assert_eq!(response.body["xp"], 0);
    assert_eq!(response.body["badges"], json!([]));
    assert!(response.body.get("password_hash").is_none());

    let login = app
        .post(
            "/auth/login",
            None,
            json!({"email": "new.user@dev.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["token_type"], "bearer");
    let token = login.body["access_token"].as_str().unwrap();

    let me = app.get("/auth/me", Some(token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "new.user@dev.com");
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::new();
    app.register_and_login("dup@dev.com", "intern").await;
    let response = app
        .post(
            "/auth/register",
            None,
            json!({"email": "DUP@dev.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["detail"], "Email already registered");
    assert_eq!(response.body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();
    let bad_email = app
        .post(
            "/auth/register",
            None,
            json!({"email": "not-an-email", "password": PASSWORD}),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::UNPROCESSABLE_ENTITY);

    let short_password = app
        .post(
            "/auth/register",
            None,
            json!({"email": "short@dev.com", "password": "123"}),
        )
        .await;
    assert_eq!(short_password.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_bad_credentials() {
    let app = TestApp::new();
    app.register_and_login("user@dev.com", "intern").await;

    let wrong_password = app
        .post(
            "/auth/login",
            None,
            json!({"email": "user@dev.com", "password": "wrong-password"}),
        )
        .await;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body["detail"], "Invalid email or password");

    let unknown = app
        .post(
            "/auth/login",
            None,
            json!({"email": "ghost@dev.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["detail"], "Invalid email or password");
}

#[tokio::test]
async fn test_protected_routes_need_a_valid_token() {
    let app = TestApp::new();

    let missing = app.get("/auth/me", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["detail"], "Missing credentials");

    let garbage = app.get("/auth/me", Some("not-a-jwt")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.body["detail"], "Invalid token");

    let (user_id, token) = app.token_for("gone@dev.com", "intern").await;
    app.store().clear().await.unwrap();
    let deleted = app.get("/auth/me", Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::UNAUTHORIZED, "user {user_id}");
}

#[tokio::test]
async fn test_admin_role_cannot_be_self_registered() {
    let app = TestApp::new();
    let response = app
        .post(
            "/auth/register",
            None,
            json!({"email": "mallory@dev.com", "password": PASSWORD, "role": "admin"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["code"], "FORBIDDEN");

    // No account was created, so the admin API stays out of reach
    let login = app
        .post(
            "/auth/login",
            None,
            json!({"email": "mallory@dev.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);

    let token = app.register_and_login("mallory@dev.com", "intern").await;
    let create = app
        .post(
            "/admin/roadmap/nodes",
            Some(&token),
            json!({"title": "Injected", "direction": "backend"}),
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);
}
