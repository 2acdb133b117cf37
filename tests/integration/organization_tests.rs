//! Organization and membership integration tests

use serde_json::json;

use contora::middleware::auth::create_access_token;

use crate::common::{register_user, Session, TestApp};

/// Mint an access token for a user scoped to a foreign organization.
/// Login always scopes to the user's own organization, so membership in
/// someone else's organization needs a directly minted token.
fn token_for_org(app: &TestApp, session: &Session, organization_id: uuid::Uuid) -> String {
    create_access_token(
        &session.user_id,
        &organization_id,
        &session.email,
        &app.state.config.auth.jwt_secret,
        1,
    )
    .expect("Failed to mint test token")
}

#[tokio::test]
async fn test_current_organization() {
    let app = TestApp::new().await;
    let session = register_user(&app, "owner@example.com", "Widget Co").await;

    let response = app
        .get_auth("/api/v1/organizations/current", &session.token)
        .await;
    response.assert_ok();

    let org: serde_json::Value = response.json();
    assert_eq!(org["name"], "Widget Co");
    assert_eq!(org["ownerId"], session.user_id.to_string().as_str());
}

#[tokio::test]
async fn test_owner_is_listed_as_member() {
    let app = TestApp::new().await;
    let session = register_user(&app, "owner@example.com", "Widget Co").await;

    let response = app
        .get_auth("/api/v1/organizations/current/members", &session.token)
        .await;
    response.assert_ok();

    let members: Vec<serde_json::Value> = response.json();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["role"], "owner");
    assert_eq!(members[0]["status"], "active");
    assert_eq!(members[0]["email"], "owner@example.com");
}

#[tokio::test]
async fn test_invite_member() {
    let app = TestApp::new().await;
    let owner = register_user(&app, "owner@example.com", "Widget Co").await;
    register_user(&app, "new-hire@example.com", "Personal Org").await;

    let response = app
        .post_json_auth(
            "/api/v1/organizations/current/members",
            json!({ "email": "new-hire@example.com", "role": "member" }),
            &owner.token,
        )
        .await;
    response.assert_created();

    let member: serde_json::Value = response.json();
    assert_eq!(member["role"], "member");
    assert_eq!(member["status"], "invited");

    // Inviting twice conflicts
    app.post_json_auth(
        "/api/v1/organizations/current/members",
        json!({ "email": "new-hire@example.com", "role": "member" }),
        &owner.token,
    )
    .await
    .assert_conflict();
}

#[tokio::test]
async fn test_invite_unknown_email_returns_404() {
    let app = TestApp::new().await;
    let owner = register_user(&app, "owner@example.com", "Widget Co").await;

    app.post_json_auth(
        "/api/v1/organizations/current/members",
        json!({ "email": "ghost@example.com", "role": "member" }),
        &owner.token,
    )
    .await
    .assert_not_found();
}

#[tokio::test]
async fn test_cannot_invite_second_owner() {
    let app = TestApp::new().await;
    let owner = register_user(&app, "owner@example.com", "Widget Co").await;
    register_user(&app, "rival@example.com", "Rival Org").await;

    app.post_json_auth(
        "/api/v1/organizations/current/members",
        json!({ "email": "rival@example.com", "role": "owner" }),
        &owner.token,
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn test_plain_member_cannot_manage_members() {
    let app = TestApp::new().await;
    let owner = register_user(&app, "owner@example.com", "Widget Co").await;
    let member = register_user(&app, "worker@example.com", "Worker Org").await;

    app.post_json_auth(
        "/api/v1/organizations/current/members",
        json!({ "email": "worker@example.com", "role": "member" }),
        &owner.token,
    )
    .await
    .assert_created();

    let member_token = token_for_org(&app, &member, owner.organization_id);

    app.post_json_auth(
        "/api/v1/organizations/current/members",
        json!({ "email": "another@example.com", "role": "member" }),
        &member_token,
    )
    .await
    .assert_forbidden();

    app.delete_auth(
        &format!("/api/v1/organizations/current/members/{}", owner.user_id),
        &member_token,
    )
    .await
    .assert_forbidden();
}

#[tokio::test]
async fn test_remove_member_locks_them_out() {
    let app = TestApp::new().await;
    let owner = register_user(&app, "owner@example.com", "Widget Co").await;
    let worker = register_user(&app, "worker@example.com", "Worker Org").await;

    app.post_json_auth(
        "/api/v1/organizations/current/members",
        json!({ "email": "worker@example.com", "role": "member" }),
        &owner.token,
    )
    .await
    .assert_created();

    let worker_token = token_for_org(&app, &worker, owner.organization_id);
    app.get_auth("/api/v1/quotes", &worker_token).await.assert_ok();

    app.delete_auth(
        &format!("/api/v1/organizations/current/members/{}", worker.user_id),
        &owner.token,
    )
    .await
    .assert_ok();

    // The still-valid token no longer grants access
    app.get_auth("/api/v1/quotes", &worker_token)
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn test_owner_cannot_be_removed() {
    let app = TestApp::new().await;
    let owner = register_user(&app, "owner@example.com", "Widget Co").await;

    app.delete_auth(
        &format!("/api/v1/organizations/current/members/{}", owner.user_id),
        &owner.token,
    )
    .await
    .assert_bad_request();
}
