use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::{id_by_title, TestApp};

fn titles(nodes: &Value) -> Vec<&str> {
    nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_directions_of_seeded_roadmap() {
    let app = TestApp::seeded().await;
    let response = app.get("/roadmap/directions", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!(["backend", "career", "devops", "frontend"])
    );

    let all = app.get("/roadmap/", None).await;
    assert_eq!(all.body.as_array().unwrap().len(), 17);
}

#[tokio::test]
async fn test_direction_nodes_are_ordered() {
    let app = TestApp::seeded().await;
    let response = app.get("/roadmap/directions/backend", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        titles(&response.body),
        vec![
            "Backend Initiate",
            "Python Basics",
            "Databases & SQL",
            "FastAPI & Pydantic"
        ]
    );

    let fastapi = &response.body[3];
    assert_eq!(fastapi["parent_ids"].as_array().unwrap().len(), 2);
    assert_eq!(fastapi["checkpoint"], true);

    let unknown = app.get("/roadmap/directions/astronomy", None).await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(unknown.body, json!([]));
}

#[tokio::test]
async fn test_tree_nests_children() {
    let app = TestApp::seeded().await;
    let response = app.get("/roadmap/tree/frontend", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let forest = response.body.as_array().unwrap();
    assert_eq!(forest.len(), 1);
    let root = &forest[0];
    assert_eq!(root["title"], "Frontend Adventurer");
    assert_eq!(
        titles(&root["children"]),
        vec!["HTML & Semantics", "CSS & Layout", "JavaScript Basics"]
    );
    let js = &root["children"][2];
    assert_eq!(titles(&js["children"]), vec!["React Fundamentals"]);
}

#[tokio::test]
async fn test_tree_depth_query() {
    let app = TestApp::seeded().await;

    let shallow = app.get("/roadmap/tree/frontend?max_depth=1", None).await;
    let root = &shallow.body[0];
    assert_eq!(root["children"].as_array().unwrap().len(), 3);
    assert_eq!(root["children"][2]["children"], json!([]));

    let flat = app.get("/roadmap/tree/frontend?max_depth=0", None).await;
    assert_eq!(flat.body[0]["children"], json!([]));

    let career = app.get("/roadmap/tree/career?max_depth=2", None).await;
    let junior = &career.body[0]["children"][0];
    assert_eq!(junior["title"], "Junior Developer");
    assert_eq!(junior["children"][0]["title"], "Middle Developer");
    assert_eq!(junior["children"][0]["children"], json!([]));
}

#[tokio::test]
async fn test_tree_depth_is_capped_by_configuration() {
    let mut config = roadmap_platform::config::AppConfig::for_testing();
    config.web.max_tree_depth = 1;
    let app = TestApp::with_config(config);
    let (_, admin) = app.token_for("lead@dev.com", "lead").await;

    let a = app
        .create_node(&admin, json!({"direction": "qa", "title": "A"}))
        .await;
    let b = app
        .create_node(&admin, json!({"direction": "qa", "title": "B", "parent_ids": [a]}))
        .await;
    app.create_node(&admin, json!({"direction": "qa", "title": "C", "parent_ids": [b]}))
        .await;

    let response = app.get("/roadmap/tree/qa?max_depth=50", None).await;
    assert_eq!(response.body[0]["children"][0]["title"], "B");
    assert_eq!(response.body[0]["children"][0]["children"], json!([]));
}

#[tokio::test]
async fn test_single_node() {
    let app = TestApp::seeded().await;
    let all = app.get("/roadmap/", None).await;
    let react = id_by_title(&all.body, "React Fundamentals");
    let js = id_by_title(&all.body, "JavaScript Basics");

    let response = app.get(&format!("/roadmap/node/{react}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], react);
    assert_eq!(response.body["parent_ids"], json!([js]));
    assert_eq!(response.body["blocked_by"], json!([]));

    let missing = app.get("/roadmap/node/424242", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["detail"], "Node not found");
}

#[tokio::test]
async fn test_cyclic_data_serializes_finitely() {
    let app = TestApp::new();
    let (_, admin) = app.token_for("lead@dev.com", "lead").await;
    let a = app
        .create_node(&admin, json!({"direction": "loop", "title": "A"}))
        .await;
    let b = app
        .create_node(&admin, json!({"direction": "loop", "title": "B", "parent_ids": [a]}))
        .await;

    // The API refuses the cycle, so write the back edge straight to the store
    app.store()
        .add_edge(roadmap_platform::models::NodeEdge::new(b, a))
        .await
        .unwrap();

    let response = app.get(&format!("/roadmap/node/{a}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["children"][0]["id"], b);
    assert_eq!(response.body["children"][0]["children"], json!([]));
}

#[tokio::test]
async fn test_malformed_path_and_query_return_json_errors() {
    let app = TestApp::seeded().await;

    let bad_id = app.get("/roadmap/node/abc", None).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.body["code"], "BAD_REQUEST");
    assert!(bad_id.body["detail"].is_string());

    let bad_depth = app.get("/roadmap/tree/backend?max_depth=-1", None).await;
    assert_eq!(bad_depth.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(bad_depth.body["code"], "VALIDATION_ERROR");
    assert!(bad_depth.body["detail"].is_string());
}
