//! Test fixtures
//!
//! Helpers that drive the real HTTP API to set up test data: registered
//! users with their organizations, and quotes in various lifecycle states.

use serde_json::json;
use uuid::Uuid;

use super::test_app::TestApp;

/// An authenticated test session: a registered user with an organization
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
}

/// Register a fresh user (and organization) and return their session
pub async fn register_user(app: &TestApp, email: &str, organization_name: &str) -> Session {
    let response = app
        .post_json(
            "/api/v1/auth/register",
            json!({
                "email": email,
                "displayName": "Test User",
                "password": "correct-horse-battery",
                "organizationName": organization_name,
            }),
        )
        .await;
    response.assert_created();

    let body: serde_json::Value = response.json();
    let token = body["accessToken"].as_str().expect("access token").to_string();
    let user_id = body["user"]["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("user id");

    // Organization ID is not part of the token response; resolve it via /me
    let me = app.get_auth("/api/v1/auth/me", &token).await;
    me.assert_ok();
    let me_body: serde_json::Value = me.json();
    let organization_id = me_body["organizationId"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("organization id");

    Session {
        token,
        user_id,
        organization_id,
        email: email.to_string(),
    }
}

/// Register a default session for tests that only need one tenant
pub async fn default_session(app: &TestApp) -> Session {
    register_user(app, "owner@example.com", "Test Org").await
}

/// Create a draft quote and return its JSON representation
pub async fn create_quote(app: &TestApp, session: &Session) -> serde_json::Value {
    let response = app
        .post_json_auth(
            "/api/v1/quotes",
            json!({
                "clientName": "Acme GmbH",
                "issueDate": "2026-01-15",
                "validUntil": "2026-02-15",
                "currency": "EUR",
                "total": "1299.99",
            }),
            &session.token,
        )
        .await;
    response.assert_created();
    response.json()
}

/// Create a quote and drive it to the given status via lifecycle actions
pub async fn create_quote_in_status(
    app: &TestApp,
    session: &Session,
    status: &str,
) -> serde_json::Value {
    let quote = create_quote(app, session).await;
    let id = quote["id"].as_str().expect("quote id").to_string();

    let actions: &[&str] = match status {
        "DRAFT" => &[],
        "SENT" => &["send"],
        "ACCEPTED" => &["send", "accept"],
        "REJECTED" => &["send", "reject"],
        "EXPIRED" => &["send", "expire"],
        other => panic!("Unsupported fixture status: {}", other),
    };

    let mut current = quote;
    for action in actions {
        let response = app
            .post_auth(&format!("/api/v1/quotes/{}/{}", id, action), &session.token)
            .await;
        response.assert_ok();
        current = response.json();
    }

    assert_eq!(current["status"], status);
    current
}
