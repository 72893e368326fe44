use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_team_stats_on_seeded_data() {
    let app = TestApp::seeded().await;
    let response = app.get("/team/stats", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total_users"], 4);
    assert_eq!(response.body["total_xp"], 2650);
    assert_eq!(response.body["average_xp"], 662.5);
    assert_eq!(response.body["users_by_role"]["lead"], 1);
    assert_eq!(response.body["top_learners"][0]["email"], "lead@dev.com");
}

#[tokio::test]
async fn test_professions() {
    let app = TestApp::seeded().await;
    let response = app.get("/team/professions", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let professions = response.body.as_array().unwrap();
    assert_eq!(professions.len(), 4);
    assert_eq!(professions[0]["direction"], "backend");
    assert_eq!(professions[0]["node_count"], 4);
    assert_eq!(professions[0]["checkpoint_count"], 2);
}

#[tokio::test]
async fn test_corporate_dashboard() {
    let app = TestApp::seeded().await;
    let response = app.get("/corporate/dashboard", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total_users"], 4);
    assert_eq!(response.body["total_nodes"], 17);
    assert_eq!(response.body["badge_distribution"]["Apprentice"], 4);
    assert_eq!(response.body["badge_distribution"]["Master"], 1);
    assert_eq!(response.body["directions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_user_settings() {
    let app = TestApp::new();
    let (_, admin) = app.token_for("lead@dev.com", "lead").await;
    app.create_node(&admin, json!({"direction": "frontend", "title": "HTML"}))
        .await;
    let (_, token) = app.token_for("learner@dev.com", "intern").await;

    let anonymous = app.get("/user/settings", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let initial = app.get("/user/settings", Some(&token)).await;
    assert_eq!(initial.status, StatusCode::OK);
    assert_eq!(initial.body, json!({"profession": null, "preferences": {}}));

    let updated = app
        .post(
            "/user/settings",
            Some(&token),
            json!({"profession": "frontend", "preferences": {"theme": "dark"}}),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["profession"], "frontend");

    let merged = app
        .post(
            "/user/settings",
            Some(&token),
            json!({"preferences": {"sound": false}}),
        )
        .await;
    assert_eq!(
        merged.body["preferences"],
        json!({"theme": "dark", "sound": false})
    );
    assert_eq!(merged.body["profession"], "frontend");

    let unknown = app
        .post(
            "/user/settings",
            Some(&token),
            json!({"profession": "astronaut"}),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
}
