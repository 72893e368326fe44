//! Shared helpers for the HTTP integration tests.
//!
//! Every test builds the full router over a fresh [`MemoryStore`] and drives
//! it in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use roadmap_platform::config::AppConfig;
use roadmap_platform::models::NewUser;
use roadmap_platform::seed::{DataManager, SeedFiles};
use roadmap_platform::storage::{MemoryStore, RoadmapStore};
use roadmap_platform::web::{create_app, AppState};

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_testing())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store: Arc<dyn RoadmapStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(Arc::new(config), store);
        Self {
            router: create_app(state.clone()),
            state,
        }
    }

    /// App loaded with the built-in demo roadmap, users and progress
    pub async fn seeded() -> Self {
        let app = Self::new();
        DataManager::new(app.store(), app.state.auth.hasher().clone())
            .initialize(&SeedFiles::default(), false)
            .await
            .expect("seed");
        app
    }

    pub fn store(&self) -> Arc<dyn RoadmapStore> {
        self.state.store.clone()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register through the API and return a bearer token
    pub async fn register_and_login(&self, email: &str, role: &str) -> String {
        let response = self
            .post(
                "/auth/register",
                None,
                json!({"email": email, "password": PASSWORD, "role": role}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "register: {:?}", response.body);
        self.login(email).await
    }

    pub async fn login(&self, email: &str) -> String {
        let response = self
            .post(
                "/auth/login",
                None,
                json!({"email": email, "password": PASSWORD}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login: {:?}", response.body);
        response.body["access_token"]
            .as_str()
            .expect("access_token")
            .to_string()
    }

    /// Token for a user inserted straight into the store, skipping password hashing
    pub async fn token_for(&self, email: &str, role: &str) -> (i64, String) {
        let user = self
            .store()
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: "unused".to_string(),
                role: role.to_string(),
                xp: 0,
                badges: Vec::new(),
            })
            .await
            .expect("create user");
        let token = self
            .state
            .auth
            .authenticator()
            .generate_token(user.id, &user.role)
            .expect("token");
        (user.id, token)
    }

    /// Create a node through the admin API and return its id
    pub async fn create_node(&self, admin_token: &str, body: Value) -> i64 {
        let response = self
            .post("/admin/roadmap/nodes", Some(admin_token), body)
            .await;
        assert_eq!(response.status, StatusCode::OK, "create node: {:?}", response.body);
        response.body["id"].as_i64().expect("node id")
    }
}

/// Find a node id by title in a flat node list
pub fn id_by_title(nodes: &Value, title: &str) -> i64 {
    nodes
        .as_array()
        .and_then(|nodes| nodes.iter().find(|n| n["title"] == title))
        .and_then(|n| n["id"].as_i64())
        .unwrap_or_else(|| panic!("node {title} not found"))
}
