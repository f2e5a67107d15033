use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration};
use identity_api::{build_app, builtin_entities, resolve, AppState, JwtVerifier, MemoryRepository, Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    token: String,
}

impl TestApp {
    fn new() -> Self {
        Self::with_env(&[])
    }

    fn with_env(overrides: &[(&str, &str)]) -> Self {
        let settings = Settings::from_lookup(|key| match key {
            "JWT_SECRET" => Some("test-secret".into()),
            _ => overrides.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string()),
        })
        .unwrap();
        let verifier = JwtVerifier::new(&settings.jwt).unwrap();
        let token = verifier.issue("1", Duration::minutes(10)).unwrap();
        let state = AppState {
            repository: Arc::new(MemoryRepository::new()),
            catalog: Arc::new(resolve(&builtin_entities()).unwrap()),
            verifier: Arc::new(verifier),
        };
        TestApp {
            router: build_app(state, &settings),
            token,
        }
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Body>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let body = match body {
            Some(b) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                b
            }
            None => Body::empty(),
        };
        let resp = self.router.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = body.map(|b| Body::from(b.to_string()));
        self.call(method, uri, Some(self.token.as_str()), body).await
    }
}

#[tokio::test]
async fn entity_routes_require_a_bearer_token() {
    let app = TestApp::new();

    let (status, body) = app.call(Method::GET, "/api/v1/roles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unauthenticated");

    let (status, _) = app.call(Method::GET, "/api/v1/roles", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn out_of_range_pagination_falls_back_to_defaults() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/v1/roles?page=0&limit=500", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));
    assert_eq!(
        body["pagination"],
        json!({"page": 1, "limit": 20, "total": 0, "total_pages": 0, "has_next": false, "has_prev": false})
    );

    let (_, body) = app.send(Method::GET, "/api/v1/roles?page=abc&limit=", None).await;
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 20);
}

#[tokio::test]
async fn put_resets_omitted_fields_and_patch_merges() {
    let app = TestApp::new();

    let (status, created) = app.send(Method::POST, "/api/v1/roles", Some(json!({"name": "admin"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Role created successfully");
    let id = created["data"]["id"].as_u64().unwrap();

    let (status, body) = app
        .send(Method::PUT, &format!("/api/v1/roles/{id}"), Some(json!({"description": "x"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "");
    assert_eq!(body["data"]["description"], "x");

    let (status, body) = app
        .send(Method::PATCH, &format!("/api/v1/roles/{id}"), Some(json!({"name": "owner"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "owner");
    assert_eq!(body["data"]["description"], "x");

    let (_, body) = app.send(Method::GET, &format!("/api/v1/roles/{id}"), None).await;
    assert_eq!(body["data"]["name"], "owner");
}

#[tokio::test]
async fn bad_ids_and_missing_records() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/v1/roles/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, _) = app.send(Method::GET, "/api/v1/roles/-4", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(Method::GET, "/api/v1/roles/12", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Role not found");

    let (status, _) = app.send(Method::PUT, "/api/v1/roles/12", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::DELETE, "/api/v1/roles/12", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = TestApp::new();
    let (_, created) = app.send(Method::POST, "/api/v1/groups", Some(json!({"name": "ops"}))).await;
    let uri = format!("/api/v1/groups/{}", created["data"]["id"]);

    let (status, body) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Group deleted successfully");
    assert!(body.get("data").is_none());

    let (status, _) = app.send(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::POST, "/api/v1/roles", Some(json!({"description": "no name"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");

    let (status, _) = app.send(Method::POST, "/api/v1/roles", Some(json!(["admin"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let token = app.token.clone();
    let (status, body) = app
        .call(Method::POST, "/api/v1/roles", Some(&token), Some(Body::from("{\"name\":")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, _) = app
        .send(Method::POST, "/api/v1/permissions", Some(json!({"name": "Bad Name", "resource": "r", "action": "a"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn composite_key_routes() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::POST, "/api/v1/user_roles", Some(json!({"user_id": 3, "role_id": 5})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user_id"], 3);
    assert!(body["data"].get("id").is_none());

    let (status, body) = app.send(Method::GET, "/api/v1/user_roles/3/5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role_id"], 5);

    let (status, _) = app.send(Method::GET, "/api/v1/user_roles/3/x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::DELETE, "/api/v1/user_roles/3/5", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::GET, "/api/v1/user_roles/3/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hidden_fields_are_not_serialized() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/users",
            Some(json!({"username": "ann", "email": "ann@example.com", "password_hash": "$argon2id$..."})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"].get("password_hash").is_none());
    assert_eq!(body["data"]["is_active"], false);
    assert_eq!(body["data"]["last_login_at"], Value::Null);

    let (_, body) = app.send(Method::GET, "/api/v1/users", None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert!(body["data"][0].get("password_hash").is_none());
}

#[tokio::test]
async fn common_routes_are_open() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "ok");

    let (status, body) = app.call(Method::GET, "/version", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "identity-api");
    assert_eq!(body["api"], "/api/v1");
    assert_eq!(body["entities"].as_array().unwrap().len(), 18);
    assert!(body["entities"].as_array().unwrap().contains(&json!("organization_members")));
}

fn timestamp(v: &Value) -> DateTime<chrono::FixedOffset> {
    DateTime::parse_from_rfc3339(v.as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn composite_updates_keep_the_key() {
    let app = TestApp::new();
    let (status, created) = app
        .send(
            Method::POST,
            "/api/v1/organization_members",
            Some(json!({"organization_id": 7, "user_id": 9, "member_role": "admin"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let created = &created["data"];

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/v1/organization_members/7/9",
            Some(json!({"organization_id": 1, "user_id": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let row = &body["data"];
    assert_eq!(row["organization_id"], 7);
    assert_eq!(row["user_id"], 9);
    assert_eq!(row["member_role"], "");
    assert_eq!(row["created_at"], created["created_at"]);
    assert!(timestamp(&row["updated_at"]) >= timestamp(&created["updated_at"]));

    let (status, body) = app
        .send(
            Method::PATCH,
            "/api/v1/organization_members/7/9",
            Some(json!({"member_role": "owner", "user_id": 3})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], 9);
    assert_eq!(body["data"]["member_role"], "owner");

    let (status, body) = app
        .send(Method::PATCH, "/api/v1/organization_members/7/9", Some(json!({"organization_id": 4})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["organization_id"], 7);
    assert_eq!(body["data"]["member_role"], "owner");

    let (status, _) = app.send(Method::GET, "/api/v1/organization_members/1/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = app.send(Method::GET, "/api/v1/organization_members", None).await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn routing_and_limit_failures_use_the_envelope() {
    let app = TestApp::with_env(&[("BODY_LIMIT_BYTES", "64")]);

    let (status, body) = app.call(Method::GET, "/api/v1/no_such_entity", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");

    let (status, body) = app.call(Method::POST, "/health", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "method_not_allowed");

    let (status, body) = app
        .send(Method::POST, "/api/v1/roles", Some(json!({"name": "x".repeat(40), "description": "y".repeat(40)})))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "payload_too_large");
}
