//! Authentication flow integration tests

use serde_json::json;

use crate::common::{default_session, register_user, TestApp};

#[tokio::test]
async fn test_register_returns_tokens_and_user() {
    let app = TestApp::new().await;
    let response = app
        .post_json(
            "/api/v1/auth/register",
            json!({
                "email": "alice@example.com",
                "displayName": "Alice",
                "password": "a-long-enough-password",
                "organizationName": "Alice Consulting",
            }),
        )
        .await;

    response.assert_created();
    let body: serde_json::Value = response.json();
    assert!(body["accessToken"].as_str().is_some());
    assert!(body["refreshToken"].as_str().is_some());
    assert_eq!(body["user"]["email"], "alice@example.com");
    // Credential material must never appear in responses
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let app = TestApp::new().await;
    default_session(&app).await;

    let response = app
        .post_json(
            "/api/v1/auth/register",
            json!({
                "email": "owner@example.com",
                "displayName": "Other",
                "password": "a-long-enough-password",
                "organizationName": "Other Org",
            }),
        )
        .await;

    response.assert_conflict();
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = TestApp::new().await;
    let response = app
        .post_json(
            "/api/v1/auth/register",
            json!({
                "email": "bob@example.com",
                "displayName": "Bob",
                "password": "short",
                "organizationName": "Bob Inc",
            }),
        )
        .await;

    response.assert_unprocessable();
}

#[tokio::test]
async fn test_login_round_trip() {
    let app = TestApp::new().await;
    default_session(&app).await;

    let response = app
        .post_json(
            "/api/v1/auth/login",
            json!({
                "email": "owner@example.com",
                "password": "correct-horse-battery",
            }),
        )
        .await;

    response.assert_ok();
    let body: serde_json::Value = response.json();
    assert!(body["accessToken"].as_str().is_some());
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = TestApp::new().await;
    default_session(&app).await;

    let response = app
        .post_json(
            "/api/v1/auth/login",
            json!({
                "email": "owner@example.com",
                "password": "wrong-password-entirely",
            }),
        )
        .await;

    response.assert_unauthorized();
}

#[tokio::test]
async fn test_me_reflects_session() {
    let app = TestApp::new().await;
    let session = register_user(&app, "carol@example.com", "Carol LLC").await;

    let response = app.get_auth("/api/v1/auth/me", &session.token).await;
    response.assert_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["email"], "carol@example.com");
    assert_eq!(
        body["organizationId"],
        session.organization_id.to_string().as_str()
    );
    assert_eq!(body["role"], "owner");
}

#[tokio::test]
async fn test_refresh_token_cannot_access_api() {
    let app = TestApp::new().await;
    let response = app
        .post_json(
            "/api/v1/auth/register",
            json!({
                "email": "dave@example.com",
                "displayName": "Dave",
                "password": "a-long-enough-password",
                "organizationName": "Dave Org",
            }),
        )
        .await;
    response.assert_created();
    let body: serde_json::Value = response.json();
    let refresh = body["refreshToken"].as_str().unwrap();

    app.get_auth("/api/v1/quotes", refresh)
        .await
        .assert_unauthorized();
}
