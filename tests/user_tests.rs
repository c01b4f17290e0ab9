use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use revoult::config::Config;

/// Default API key seeded by migration (must match m20240101_initial.rs)
const DEFAULT_API_KEY: &str = "revoult_default_api_key_please_regenerate";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single connection keeps every query on the same in-memory database.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;
    config.observability.metrics_enabled = false;

    let state = revoult::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");
    revoult::api::router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn create_user(app: &Router, email: &str, password: &str) -> axum::response::Response {
    let payload = serde_json::json!({ "email": email, "password": password });
    app.clone()
        .oneshot(json_request("POST", "/api/admin/users", &payload))
        .await
        .unwrap()
}

async fn list_users(app: &Router) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/users")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn test_create_user() {
    let app = spawn_app().await;

    let response = create_user(&app, "editor@example.com", "longenough").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["email"], "editor@example.com");
    // Password material never leaves the server.
    assert!(json["data"].get("password").is_none());
    assert!(json["data"].get("passwordHash").is_none());

    let users = list_users(&app).await;
    assert_eq!(users["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_user_validation() {
    let app = spawn_app().await;

    let response = create_user(&app, "", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Email and password are required");

    let response = create_user(&app, "not-an-email", "longenough").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = create_user(&app, "editor@example.com", "short").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_email_rejected_without_mutation() {
    let app = spawn_app().await;

    let response = create_user(&app, "editor@example.com", "longenough").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let original_id = created["data"]["id"].as_i64().unwrap();

    let response = create_user(&app, "editor@example.com", "differentpw").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "User already exists with this email");

    // Original record untouched, and the original password still works.
    let users = list_users(&app).await;
    let users = users["data"].as_array().unwrap().clone();
    assert_eq!(users.len(), 2);
    assert!(
        users
            .iter()
            .any(|u| u["id"].as_i64() == Some(original_id)
                && u["email"] == "editor@example.com")
    );

    let login = serde_json::json!({
        "email": "editor@example.com",
        "password": "longenough"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/login", &login))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cannot_delete_own_account() {
    let app = spawn_app().await;

    // The seeded admin is the actor behind DEFAULT_API_KEY.
    let users = list_users(&app).await;
    let admin_id = users["data"].as_array().unwrap()[0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/users/{admin_id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "You cannot delete your own account");

    // Record persists.
    let users = list_users(&app).await;
    assert!(
        users["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|u| u["id"].as_i64() == Some(admin_id))
    );
}

#[tokio::test]
async fn test_delete_other_user() {
    let app = spawn_app().await;

    let response = create_user(&app, "temp@example.com", "longenough").await;
    let created = body_json(response).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/users/{id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/admin/users/{id}"))
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_user_password_rehashes() {
    let app = spawn_app().await;

    let response = create_user(&app, "editor@example.com", "longenough").await;
    let created = body_json(response).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let payload = serde_json::json!({ "password": "evenlonger1" });
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{id}"),
            &payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works, new one does.
    let old_login = serde_json::json!({
        "email": "editor@example.com",
        "password": "longenough"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/login", &old_login))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let new_login = serde_json::json!({
        "email": "editor@example.com",
        "password": "evenlonger1"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/login", &new_login))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_user_email() {
    let app = spawn_app().await;

    let response = create_user(&app, "old@example.com", "longenough").await;
    let created = body_json(response).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let payload = serde_json::json!({ "email": "new@example.com" });
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{id}"),
            &payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "new@example.com");

    // Renaming onto an existing account is rejected.
    let payload = serde_json::json!({ "email": "admin@example.com" });
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{id}"),
            &payload,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_user() {
    let app = spawn_app().await;

    let payload = serde_json::json!({ "email": "ghost@example.com" });
    let response = app
        .oneshot(json_request("PUT", "/api/admin/users/999", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_and_me() {
    let app = spawn_app().await;

    let login = serde_json::json!({
        "email": "admin@example.com",
        "password": "password"
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(login.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "admin@example.com");
    assert_eq!(json["data"]["apiKey"], DEFAULT_API_KEY);

    let bad_login = serde_json::json!({
        "email": "admin@example.com",
        "password": "wrong-password"
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(bad_login.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // /auth/me works with the API key credential as well.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("X-Api-Key", DEFAULT_API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "admin@example.com");
}
