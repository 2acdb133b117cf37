//! Quote lifecycle integration tests
//!
//! Exercises the full workflow over HTTP: draft creation, status actions,
//! conversion to invoice, illegal-action rejection and tenant isolation.

use serde_json::json;

use crate::common::{create_quote, create_quote_in_status, default_session, register_user, TestApp};

#[tokio::test]
async fn test_create_quote_starts_as_draft() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;

    let quote = create_quote(&app, &session).await;

    assert_eq!(quote["status"], "DRAFT");
    assert_eq!(quote["clientName"], "Acme GmbH");
    assert_eq!(quote["currency"], "EUR");
    assert_eq!(quote["total"], "1299.99");
    assert!(quote["convertedInvoiceId"].is_null());

    let number = quote["number"].as_str().unwrap();
    assert!(number.starts_with("Q-"), "Unexpected number: {}", number);
}

#[tokio::test]
async fn test_quote_numbers_are_sequential() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;

    let first = create_quote(&app, &session).await;
    let second = create_quote(&app, &session).await;

    let n1 = first["number"].as_str().unwrap();
    let n2 = second["number"].as_str().unwrap();
    assert_ne!(n1, n2);
    assert!(n1 < n2, "Numbers should grow: {} then {}", n1, n2);
}

#[tokio::test]
async fn test_send_transitions_draft_to_sent() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;
    let quote = create_quote(&app, &session).await;
    let id = quote["id"].as_str().unwrap();

    let response = app
        .post_auth(&format!("/api/v1/quotes/{}/send", id), &session.token)
        .await;
    response.assert_ok();
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["status"], "SENT");

    // The list reflects the new status
    let list = app.get_auth("/api/v1/quotes", &session.token).await;
    list.assert_ok();
    let quotes: Vec<serde_json::Value> = list.json();
    let listed = quotes.iter().find(|q| q["id"] == quote["id"]).unwrap();
    assert_eq!(listed["status"], "SENT");
}

#[tokio::test]
async fn test_sent_quote_can_be_accepted_rejected_or_expired() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;

    for (action, expected) in [
        ("accept", "ACCEPTED"),
        ("reject", "REJECTED"),
        ("expire", "EXPIRED"),
    ] {
        let quote = create_quote_in_status(&app, &session, "SENT").await;
        let id = quote["id"].as_str().unwrap();

        let response = app
            .post_auth(&format!("/api/v1/quotes/{}/{}", id, action), &session.token)
            .await;
        response.assert_ok();
        let updated: serde_json::Value = response.json();
        assert_eq!(updated["status"], expected);
    }
}

#[tokio::test]
async fn test_illegal_action_returns_conflict() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;

    // A draft cannot be accepted
    let quote = create_quote(&app, &session).await;
    let id = quote["id"].as_str().unwrap();
    let response = app
        .post_auth(&format!("/api/v1/quotes/{}/accept", id), &session.token)
        .await;
    response.assert_conflict();

    // A rejected quote is terminal
    let quote = create_quote_in_status(&app, &session, "REJECTED").await;
    let id = quote["id"].as_str().unwrap();
    for action in ["send", "accept", "reject", "expire"] {
        let response = app
            .post_auth(&format!("/api/v1/quotes/{}/{}", id, action), &session.token)
            .await;
        response.assert_conflict();
    }
}

#[tokio::test]
async fn test_unknown_action_returns_bad_request() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;
    let quote = create_quote(&app, &session).await;
    let id = quote["id"].as_str().unwrap();

    let response = app
        .post_auth(&format!("/api/v1/quotes/{}/archive", id), &session.token)
        .await;
    response.assert_bad_request();

    // The failed request must not have touched the quote
    let fetched = app
        .get_auth(&format!("/api/v1/quotes/{}", id), &session.token)
        .await;
    fetched.assert_ok();
    let body: serde_json::Value = fetched.json();
    assert_eq!(body["status"], "DRAFT");
}

#[tokio::test]
async fn test_convert_sent_quote_creates_invoice() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;
    let quote = create_quote_in_status(&app, &session, "SENT").await;
    let id = quote["id"].as_str().unwrap();

    let response = app
        .post_auth(
            &format!("/api/v1/quotes/{}/convert-to-invoice", id),
            &session.token,
        )
        .await;
    response.assert_created();

    let body: serde_json::Value = response.json();
    let invoice = &body["invoice"];
    assert_eq!(invoice["quoteId"], quote["id"]);
    assert_eq!(invoice["clientName"], quote["clientName"]);
    assert_eq!(invoice["currency"], quote["currency"]);
    assert_eq!(invoice["total"], quote["total"]);
    assert!(invoice["number"].as_str().unwrap().starts_with("INV-"));

    // The quote now carries the back-reference and is terminal
    let fetched = app
        .get_auth(&format!("/api/v1/quotes/{}", id), &session.token)
        .await;
    fetched.assert_ok();
    let updated: serde_json::Value = fetched.json();
    assert_eq!(updated["status"], "CONVERTED");
    assert_eq!(updated["convertedInvoiceId"], invoice["id"]);

    // The invoice is fetchable through the invoice API
    let invoice_id = invoice["id"].as_str().unwrap();
    app.get_auth(&format!("/api/v1/invoices/{}", invoice_id), &session.token)
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_convert_accepted_quote_creates_invoice() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;
    let quote = create_quote_in_status(&app, &session, "ACCEPTED").await;
    let id = quote["id"].as_str().unwrap();

    app.post_auth(
        &format!("/api/v1/quotes/{}/convert-to-invoice", id),
        &session.token,
    )
    .await
    .assert_created();
}

#[tokio::test]
async fn test_draft_quote_cannot_be_converted() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;
    let quote = create_quote(&app, &session).await;
    let id = quote["id"].as_str().unwrap();

    app.post_auth(
        &format!("/api/v1/quotes/{}/convert-to-invoice", id),
        &session.token,
    )
    .await
    .assert_conflict();
}

#[tokio::test]
async fn test_double_conversion_is_rejected() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;
    let quote = create_quote_in_status(&app, &session, "SENT").await;
    let id = quote["id"].as_str().unwrap();

    app.post_auth(
        &format!("/api/v1/quotes/{}/convert-to-invoice", id),
        &session.token,
    )
    .await
    .assert_created();

    let second = app
        .post_auth(
            &format!("/api/v1/quotes/{}/convert-to-invoice", id),
            &session.token,
        )
        .await;
    second.assert_conflict();
    let body: serde_json::Value = second.json();
    assert_eq!(body["message"], "Quote already converted");

    // Exactly one invoice exists for this quote
    let list = app.get_auth("/api/v1/invoices", &session.token).await;
    list.assert_ok();
    let invoices: Vec<serde_json::Value> = list.json();
    let linked: Vec<_> = invoices
        .iter()
        .filter(|i| i["quoteId"] == quote["id"])
        .collect();
    assert_eq!(linked.len(), 1);
}

#[tokio::test]
async fn test_converted_quote_rejects_further_actions() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;
    let quote = create_quote_in_status(&app, &session, "SENT").await;
    let id = quote["id"].as_str().unwrap();

    app.post_auth(
        &format!("/api/v1/quotes/{}/convert-to-invoice", id),
        &session.token,
    )
    .await
    .assert_created();

    for action in ["send", "accept", "reject", "expire"] {
        app.post_auth(&format!("/api/v1/quotes/{}/{}", id, action), &session.token)
            .await
            .assert_conflict();
    }
}

#[tokio::test]
async fn test_quotes_are_isolated_per_organization() {
    let app = TestApp::new().await;
    let alice = register_user(&app, "alice@example.com", "Alice Org").await;
    let bob = register_user(&app, "bob@example.com", "Bob Org").await;

    let quote = create_quote(&app, &alice).await;
    let id = quote["id"].as_str().unwrap();

    // Bob can neither read nor act on Alice's quote
    app.get_auth(&format!("/api/v1/quotes/{}", id), &bob.token)
        .await
        .assert_not_found();
    app.post_auth(&format!("/api/v1/quotes/{}/send", id), &bob.token)
        .await
        .assert_not_found();
    app.post_auth(
        &format!("/api/v1/quotes/{}/convert-to-invoice", id),
        &bob.token,
    )
    .await
    .assert_not_found();

    let list = app.get_auth("/api/v1/quotes", &bob.token).await;
    list.assert_ok();
    let quotes: Vec<serde_json::Value> = list.json();
    assert!(quotes.is_empty());
}

#[tokio::test]
async fn test_create_quote_validation() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;

    // Blank client name
    app.post_json_auth(
        "/api/v1/quotes",
        json!({
            "clientName": "   ",
            "issueDate": "2026-01-15",
            "currency": "EUR",
            "total": "100.00",
        }),
        &session.token,
    )
    .await
    .assert_unprocessable();

    // Lowercase currency
    app.post_json_auth(
        "/api/v1/quotes",
        json!({
            "clientName": "Acme",
            "issueDate": "2026-01-15",
            "currency": "eur",
            "total": "100.00",
        }),
        &session.token,
    )
    .await
    .assert_unprocessable();

    // Negative total
    app.post_json_auth(
        "/api/v1/quotes",
        json!({
            "clientName": "Acme",
            "issueDate": "2026-01-15",
            "currency": "EUR",
            "total": "-5.00",
        }),
        &session.token,
    )
    .await
    .assert_unprocessable();
}

#[tokio::test]
async fn test_get_quote_with_malformed_id() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;

    app.get_auth("/api/v1/quotes/not-a-uuid", &session.token)
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_get_missing_quote_returns_404() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;

    app.get_auth(
        &format!("/api/v1/quotes/{}", uuid::Uuid::new_v4()),
        &session.token,
    )
    .await
    .assert_not_found();
}
