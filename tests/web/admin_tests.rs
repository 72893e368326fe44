use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = TestApp::new();
    let (_, intern) = app.token_for("intern@dev.com", "intern").await;

    let anonymous = app.get("/admin/roadmap/nodes", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forbidden = app.get("/admin/roadmap/nodes", Some(&intern)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.body["code"], "FORBIDDEN");

    let create = app
        .post(
            "/admin/roadmap/nodes",
            Some(&intern),
            json!({"direction": "qa", "title": "Sneaky"}),
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);

    let (_, admin) = app.token_for("admin@dev.com", "admin").await;
    let allowed = app.get("/admin/roadmap/nodes", Some(&admin)).await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.body, json!([]));
}

#[tokio::test]
async fn test_node_lifecycle() {
    let app = TestApp::new();
    let (_, admin) = app.token_for("lead@dev.com", "lead").await;

    let created = app
        .post(
            "/admin/roadmap/nodes",
            Some(&admin),
            json!({
                "direction": "devops",
                "title": "  Linux  ",
                "description": "Shell basics",
                "resources": ["https://example.com/linux"],
                "node_type": "milestone",
                "order_index": 2
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["title"], "Linux");
    assert_eq!(created.body["node_type"], "milestone");
    assert_eq!(created.body["is_required"], true);
    assert_eq!(created.body["is_active"], true);
    let linux = created.body["id"].as_i64().unwrap();

    let docker = app
        .create_node(
            &admin,
            json!({"direction": "devops", "title": "Docker", "parent_ids": [linux]}),
        )
        .await;

    let updated = app
        .put(
            &format!("/admin/roadmap/nodes/{docker}"),
            Some(&admin),
            json!({
                "direction": "devops",
                "title": "Docker & Compose",
                "checkpoint": true,
                "parent_ids": [linux],
                "is_active": false
            }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "Docker & Compose");
    assert_eq!(updated.body["checkpoint"], true);
    assert_eq!(updated.body["is_active"], false);
    assert_eq!(updated.body["parent_ids"], json!([linux]));

    let by_ids = app
        .post(
            "/admin/roadmap/nodes/by-ids",
            Some(&admin),
            json!({"node_ids": [docker, 9999, linux]}),
        )
        .await;
    assert_eq!(by_ids.status, StatusCode::OK);
    let ids: Vec<i64> = by_ids
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![docker, linux]);

    let deleted = app
        .delete(&format!("/admin/roadmap/nodes/{linux}"), Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Node deleted successfully");

    let gone = app.get(&format!("/roadmap/node/{linux}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let orphan = app.get(&format!("/roadmap/node/{docker}"), None).await;
    assert_eq!(orphan.body["parent_ids"], json!([]));

    let again = app
        .delete(&format!("/admin/roadmap/nodes/{linux}"), Some(&admin))
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_node_input() {
    let app = TestApp::new();
    let (_, admin) = app.token_for("lead@dev.com", "lead").await;

    let empty_title = app
        .post(
            "/admin/roadmap/nodes",
            Some(&admin),
            json!({"direction": "qa", "title": "   "}),
        )
        .await;
    assert_eq!(empty_title.status, StatusCode::BAD_REQUEST);

    let missing_parent = app
        .post(
            "/admin/roadmap/nodes",
            Some(&admin),
            json!({"direction": "qa", "title": "Orphan", "parent_ids": [77]}),
        )
        .await;
    assert_eq!(missing_parent.status, StatusCode::BAD_REQUEST);

    let update_missing = app
        .put(
            "/admin/roadmap/nodes/77",
            Some(&admin),
            json!({"direction": "qa", "title": "Ghost"}),
        )
        .await;
    assert_eq!(update_missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hierarchy_cycles_are_rejected() {
    let app = TestApp::new();
    let (_, admin) = app.token_for("lead@dev.com", "lead").await;
    let a = app
        .create_node(&admin, json!({"direction": "qa", "title": "A"}))
        .await;
    let b = app
        .create_node(&admin, json!({"direction": "qa", "title": "B", "parent_ids": [a]}))
        .await;
    let c = app
        .create_node(&admin, json!({"direction": "qa", "title": "C", "parent_ids": [b]}))
        .await;

    let self_parent = app
        .put(
            &format!("/admin/roadmap/nodes/{a}"),
            Some(&admin),
            json!({"direction": "qa", "title": "A", "parent_ids": [a]}),
        )
        .await;
    assert_eq!(self_parent.status, StatusCode::BAD_REQUEST);

    let cycle = app
        .put(
            &format!("/admin/roadmap/nodes/{a}"),
            Some(&admin),
            json!({"direction": "qa", "title": "A", "parent_ids": [c]}),
        )
        .await;
    assert_eq!(cycle.status, StatusCode::BAD_REQUEST);
    assert_eq!(cycle.body["code"], "BAD_REQUEST");
    assert_eq!(cycle.body["detail"], format!("Parent {c} would create a cycle"));

    // The rejected update left A a root
    let unchanged = app.get(&format!("/roadmap/node/{a}"), None).await;
    assert_eq!(unchanged.body["parent_ids"], json!([]));
    assert_eq!(unchanged.body["children"][0]["id"], b);

    // Moving C directly under A is fine
    let moved = app
        .put(
            &format!("/admin/roadmap/nodes/{c}"),
            Some(&admin),
            json!({"direction": "qa", "title": "C", "parent_ids": [a]}),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(moved.body["parent_ids"], json!([a]));
}

#[tokio::test]
async fn test_blocks_dependencies_and_availability() {
    let app = TestApp::new();
    let (_, admin) = app.token_for("lead@dev.com", "lead").await;
    let (learner_id, learner) = app.token_for("learner@dev.com", "intern").await;

    let a = app
        .create_node(&admin, json!({"direction": "backend", "title": "A"}))
        .await;
    let b = app
        .create_node(&admin, json!({"direction": "backend", "title": "B"}))
        .await;
    let c = app
        .create_node(&admin, json!({"direction": "backend", "title": "C"}))
        .await;

    let block_ab = app
        .post(
            "/admin/roadmap/blocks",
            Some(&admin),
            json!({"blocking_node_id": a, "blocked_node_id": b}),
        )
        .await;
    assert_eq!(block_ab.status, StatusCode::OK);
    let block_ab_id = block_ab.body["id"].as_i64().unwrap();

    let block_bc = app
        .post(
            "/admin/roadmap/blocks",
            Some(&admin),
            json!({"blocking_node_id": b, "blocked_node_id": c}),
        )
        .await;
    assert_eq!(block_bc.status, StatusCode::OK);

    for (blocking, blocked) in [(a, b), (c, a), (a, a), (a, 999)] {
        let rejected = app
            .post(
                "/admin/roadmap/blocks",
                Some(&admin),
                json!({"blocking_node_id": blocking, "blocked_node_id": blocked}),
            )
            .await;
        assert_eq!(
            rejected.status,
            StatusCode::BAD_REQUEST,
            "{blocking} -> {blocked}: {:?}",
            rejected.body
        );
    }

    let deps = app
        .get(&format!("/admin/roadmap/nodes/{c}/dependencies"), Some(&admin))
        .await;
    assert_eq!(deps.status, StatusCode::OK);
    let dep_ids: Vec<i64> = deps
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_i64().unwrap())
        .collect();
    assert_eq!(dep_ids, vec![b, a]);

    let node_c = app.get(&format!("/roadmap/node/{c}"), None).await;
    assert_eq!(node_c.body["blocking_node_ids"], json!([b]));
    assert_eq!(node_c.body["blocked_by"][0]["title"], "B");

    let availability_uri = format!("/admin/roadmap/nodes/{b}/availability/{learner_id}");
    let locked = app.get(&availability_uri, Some(&admin)).await;
    assert_eq!(locked.status, StatusCode::OK);
    assert_eq!(locked.body["available"], false);
    assert_eq!(locked.body["blocking_nodes"][0]["id"], a);

    app.post(
        "/progress/update",
        Some(&learner),
        json!({"node_id": a, "status": "completed"}),
    )
    .await;
    let open = app.get(&availability_uri, Some(&admin)).await;
    assert_eq!(open.body["available"], true);
    assert_eq!(open.body["blocking_nodes"], json!([]));

    let unknown_user = app
        .get(&format!("/admin/roadmap/nodes/{b}/availability/999"), Some(&admin))
        .await;
    assert_eq!(unknown_user.status, StatusCode::NOT_FOUND);

    let removed = app
        .delete(&format!("/admin/roadmap/blocks/{block_ab_id}"), Some(&admin))
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["message"], "Block deleted successfully");

    let removed_again = app
        .delete(&format!("/admin/roadmap/blocks/{block_ab_id}"), Some(&admin))
        .await;
    assert_eq!(removed_again.status, StatusCode::NOT_FOUND);
}
