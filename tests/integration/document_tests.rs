//! Invoice and act endpoint integration tests

use serde_json::json;

use crate::common::{default_session, register_user, TestApp};

#[tokio::test]
async fn test_create_and_list_invoices() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;

    let response = app
        .post_json_auth(
            "/api/v1/invoices",
            json!({
                "clientName": "Globex Corp",
                "issueDate": "2026-03-01",
                "currency": "USD",
                "total": "4500.00",
            }),
            &session.token,
        )
        .await;
    response.assert_created();
    let invoice: serde_json::Value = response.json();
    assert_eq!(invoice["status"], "DRAFT");
    assert!(invoice["quoteId"].is_null());
    assert!(invoice["number"].as_str().unwrap().starts_with("INV-"));

    let list = app.get_auth("/api/v1/invoices", &session.token).await;
    list.assert_ok();
    let invoices: Vec<serde_json::Value> = list.json();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0]["id"], invoice["id"]);
}

#[tokio::test]
async fn test_invoice_validation() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;

    app.post_json_auth(
        "/api/v1/invoices",
        json!({
            "clientName": "",
            "issueDate": "2026-03-01",
            "currency": "USD",
            "total": "1.00",
        }),
        &session.token,
    )
    .await
    .assert_unprocessable();
}

#[tokio::test]
async fn test_invoices_are_isolated_per_organization() {
    let app = TestApp::new().await;
    let alice = register_user(&app, "alice@example.com", "Alice Org").await;
    let bob = register_user(&app, "bob@example.com", "Bob Org").await;

    let response = app
        .post_json_auth(
            "/api/v1/invoices",
            json!({
                "clientName": "Globex Corp",
                "issueDate": "2026-03-01",
                "currency": "USD",
                "total": "4500.00",
            }),
            &alice.token,
        )
        .await;
    response.assert_created();
    let invoice: serde_json::Value = response.json();
    let id = invoice["id"].as_str().unwrap();

    app.get_auth(&format!("/api/v1/invoices/{}", id), &bob.token)
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_create_get_and_delete_act() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;

    let response = app
        .post_json_auth(
            "/api/v1/acts",
            json!({
                "clientName": "Initech",
                "issueDate": "2026-04-10",
                "currency": "EUR",
                "total": "800.00",
            }),
            &session.token,
        )
        .await;
    response.assert_created();
    let act: serde_json::Value = response.json();
    let id = act["id"].as_str().unwrap();
    assert!(act["number"].as_str().unwrap().starts_with("ACT-"));

    app.get_auth(&format!("/api/v1/acts/{}", id), &session.token)
        .await
        .assert_ok();

    app.delete_auth(&format!("/api/v1/acts/{}", id), &session.token)
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    app.get_auth(&format!("/api/v1/acts/{}", id), &session.token)
        .await
        .assert_not_found();

    // Deleting again reports not found
    app.delete_auth(&format!("/api/v1/acts/{}", id), &session.token)
        .await
        .assert_not_found();
}
