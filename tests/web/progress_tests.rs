use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_progress_requires_authentication() {
    let app = TestApp::new();
    let response = app
        .post(
            "/progress/update",
            None,
            json!({"node_id": 1, "status": "completed"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_completion_awards_xp_and_badges() {
    let app = TestApp::new();
    let (_, admin) = app.token_for("lead@dev.com", "lead").await;
    let root = app
        .create_node(&admin, json!({"direction": "frontend", "title": "Basics"}))
        .await;
    let project = app
        .create_node(
            &admin,
            json!({
                "direction": "frontend",
                "title": "Project",
                "checkpoint": true,
                "parent_ids": [root]
            }),
        )
        .await;
    let capstone = app
        .create_node(
            &admin,
            json!({
                "direction": "frontend",
                "title": "Capstone",
                "checkpoint": true,
                "parent_ids": [project]
            }),
        )
        .await;

    let learner = app.register_and_login("learner@dev.com", "intern").await;

    let first = app
        .post(
            "/progress/update",
            Some(&learner),
            json!({"node_id": root, "status": "completed", "score": 85}),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["status"], "completed");
    assert_eq!(first.body["xp_awarded"], 28);
    assert_eq!(first.body["total_xp"], 28);
    assert_eq!(first.body["new_badges"], json!([]));

    let second = app
        .post(
            "/progress/update",
            Some(&learner),
            json!({"node_id": project, "status": "completed", "score": 90}),
        )
        .await;
    assert_eq!(second.body["xp_awarded"], 59);
    assert_eq!(second.body["total_xp"], 87);

    let third = app
        .post(
            "/progress/update",
            Some(&learner),
            json!({"node_id": capstone, "status": "completed", "score": 150}),
        )
        .await;
    assert_eq!(third.body["xp_awarded"], 60);
    assert_eq!(third.body["total_xp"], 147);
    assert_eq!(third.body["new_badges"], json!(["Apprentice"]));

    let repeat = app
        .post(
            "/progress/update",
            Some(&learner),
            json!({"node_id": capstone, "status": "completed", "score": 100}),
        )
        .await;
    assert_eq!(repeat.body["xp_awarded"], 0);
    assert_eq!(repeat.body["total_xp"], 147);

    let me = app.get("/auth/me", Some(&learner)).await;
    assert_eq!(me.body["xp"], 147);
    assert_eq!(me.body["badges"], json!(["Apprentice"]));

    let mine = app.get("/progress/mine", Some(&learner)).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_node_and_bad_status() {
    let app = TestApp::new();
    let (_, token) = app.token_for("learner@dev.com", "intern").await;

    let missing = app
        .post(
            "/progress/update",
            Some(&token),
            json!({"node_id": 999, "status": "completed"}),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["detail"], "Node not found");

    let bad_status = app
        .post(
            "/progress/update",
            Some(&token),
            json!({"node_id": 1, "status": "done"}),
        )
        .await;
    assert_eq!(bad_status.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(bad_status.body["code"], "VALIDATION_ERROR");
    assert!(bad_status.body["detail"]
        .as_str()
        .unwrap()
        .contains("unknown variant"));

    let missing_field = app
        .post("/progress/update", Some(&token), json!({"status": "completed"}))
        .await;
    assert_eq!(missing_field.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(missing_field.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_blocked_node_cannot_be_started() {
    let app = TestApp::new();
    let (_, admin) = app.token_for("lead@dev.com", "lead").await;
    let (_, learner) = app.token_for("learner@dev.com", "intern").await;

    let sql = app
        .create_node(&admin, json!({"direction": "backend", "title": "SQL"}))
        .await;
    let orm = app
        .create_node(
            &admin,
            json!({"direction": "backend", "title": "ORM", "blocking_node_ids": [sql]}),
        )
        .await;

    let blocked = app
        .post(
            "/progress/update",
            Some(&learner),
            json!({"node_id": orm, "status": "in_progress"}),
        )
        .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);
    assert_eq!(blocked.body["detail"], "Node is blocked by: SQL");

    let done = app
        .post(
            "/progress/update",
            Some(&learner),
            json!({"node_id": sql, "status": "completed"}),
        )
        .await;
    assert_eq!(done.status, StatusCode::OK);

    let unblocked = app
        .post(
            "/progress/update",
            Some(&learner),
            json!({"node_id": orm, "status": "in_progress"}),
        )
        .await;
    assert_eq!(unblocked.status, StatusCode::OK);
    assert_eq!(unblocked.body["status"], "in_progress");
}
