mod common;

use auth::JwtSigner;
use auth_service::domain::auth::models::RefreshSessionId;
use auth_service::domain::auth::ports::RefreshSessionStore;
use chrono::Duration;
use chrono::Utc;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

async fn login(app: &TestApp, username: &str, password: &str) -> reqwest::Response {
    app.post("/api/auth/login")
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to execute request")
}

async fn refresh(app: &TestApp, refresh_token: &str) -> reqwest::Response {
    app.post("/api/auth/refresh")
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;
    app.seed_user("alice@example.com", "correct horse").await;

    let response = login(&app, "alice@example.com", "correct horse").await;

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 200);
    assert!(!body["data"]["access_token"].as_str().unwrap().is_empty());
    assert!(!body["data"]["refresh_token"].as_str().unwrap().is_empty());

    let expires_in = body["data"]["expires_in"].as_i64().unwrap();
    assert!((899..=900).contains(&expires_in));
    assert_eq!(app.refresh_sessions.len().await, 1);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::spawn().await;
    app.seed_user("alice@example.com", "correct horse").await;

    let response = login(&app, "alice@example.com", "battery staple").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Invalid credentials");
    assert!(app.refresh_sessions.is_empty().await);
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let app = TestApp::spawn().await;
    app.seed_user("alice@example.com", "correct horse").await;

    let unknown = login(&app, "ghost@example.com", "correct horse").await;
    let wrong = login(&app, "alice@example.com", "battery staple").await;

    assert_eq!(unknown.status(), wrong.status());

    let unknown: serde_json::Value = unknown.json().await.unwrap();
    let wrong: serde_json::Value = wrong.json().await.unwrap();
    assert_eq!(unknown, wrong);
}

#[tokio::test]
async fn test_login_malformed_email() {
    let app = TestApp::spawn().await;

    let response = login(&app, "not-an-email", "whatever").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = TestApp::spawn().await;
    app.seed_user("alice@example.com", "correct horse").await;

    let first: serde_json::Value = login(&app, "alice@example.com", "correct horse")
        .await
        .json()
        .await
        .unwrap();
    let first_refresh = first["data"]["refresh_token"].as_str().unwrap();

    let response = refresh(&app, first_refresh).await;
    assert_eq!(response.status(), StatusCode::OK);

    let second: serde_json::Value = response.json().await.unwrap();
    let second_refresh = second["data"]["refresh_token"].as_str().unwrap();
    assert_ne!(second_refresh, first_refresh);
    assert!(!second["data"]["access_token"].as_str().unwrap().is_empty());

    let old_id = RefreshSessionId::parse(first_refresh).unwrap();
    let old = app.refresh_sessions.get(&old_id).await.unwrap();
    assert!(old.used);
    assert_eq!(app.refresh_sessions.len().await, 2);
}

#[tokio::test]
async fn test_refresh_twice_is_rejected() {
    let app = TestApp::spawn().await;
    app.seed_user("alice@example.com", "correct horse").await;

    let first: serde_json::Value = login(&app, "alice@example.com", "correct horse")
        .await
        .json()
        .await
        .unwrap();
    let refresh_token = first["data"]["refresh_token"].as_str().unwrap();

    assert_eq!(refresh(&app, refresh_token).await.status(), StatusCode::OK);

    let replay = refresh(&app, refresh_token).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = replay.json().await.unwrap();
    assert_eq!(body["data"]["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_refresh_with_malformed_or_unknown_token() {
    let app = TestApp::spawn().await;

    let malformed = refresh(&app, "not-a-uuid").await;
    assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);

    let unknown = refresh(&app, &RefreshSessionId::new().to_string()).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_user_with_access_token() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("alice@example.com", "correct horse").await;

    let body: serde_json::Value = login(&app, "alice@example.com", "correct horse")
        .await
        .json()
        .await
        .unwrap();
    let access_token = body["data"]["access_token"].as_str().unwrap();

    let response = app
        .get_authenticated("/api/users/me", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["id"], user.id.to_string());
    assert_eq!(body["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_current_user_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/users/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_user_with_token_from_other_key() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("alice@example.com", "correct horse").await;

    let other = JwtSigner::new(
        b"another-secret-key-for-jwt-signing-32-bytes",
        common::JWT_ISSUER,
        common::JWT_AUDIENCE,
        Duration::minutes(15),
    );
    let (token, _) = other.sign(user.id).unwrap();

    let response = app
        .get_authenticated("/api/users/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["message"], "Invalid token");
}

#[tokio::test]
async fn test_current_user_with_expired_token() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("alice@example.com", "correct horse").await;

    let (token, _) = common::signer()
        .sign_at(user.id, Utc::now() - Duration::hours(1))
        .unwrap();

    let response = app
        .get_authenticated("/api/users/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["message"], "Expired token");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/users/me")
        .header("x-request-id", "trace-me-123")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
}

#[tokio::test]
async fn test_request_id_is_generated_when_missing() {
    let app = TestApp::spawn().await;
    app.seed_user("alice@example.com", "correct horse").await;

    let response = login(&app, "alice@example.com", "correct horse").await;

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_oversized_request_id_is_replaced() {
    let app = TestApp::spawn().await;
    let oversized = "x".repeat(65);

    let response = app
        .get("/api/users/me")
        .header("x-request-id", oversized.as_str())
        .send()
        .await
        .expect("Failed to execute request");

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert_ne!(id, oversized);
    assert!(uuid::Uuid::parse_str(id).is_ok());
}
