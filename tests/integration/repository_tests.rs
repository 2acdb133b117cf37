//! Quote repository concurrency-guard tests
//!
//! The guarded updates are what keep racing mutations safe: a transition
//! only applies when the row still holds the expected status, and
//! conversion admits exactly one winner. These tests drive the repository
//! directly so the guard predicates themselves are exercised, not just the
//! policy check in front of them.

use uuid::Uuid;

use contora::db::{InvoiceRepository, QuoteRepository};
use contora::models::QuoteStatus;

use crate::common::{create_quote, default_session, TestApp};

#[tokio::test]
async fn test_transition_guard_rejects_stale_expected_status() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;
    let quote = create_quote(&app, &session).await;
    let id = Uuid::parse_str(quote["id"].as_str().unwrap()).unwrap();

    let repo = QuoteRepository::new(&app.state.db);

    // The quote is DRAFT; an update expecting SENT must not apply. This is
    // the position of a writer whose snapshot went stale before its update.
    let applied = repo
        .apply_transition(
            session.organization_id,
            id,
            QuoteStatus::Sent,
            QuoteStatus::Accepted,
        )
        .await
        .unwrap();
    assert!(!applied);

    let unchanged = repo
        .get_by_id(session.organization_id, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, QuoteStatus::Draft);

    // With the correct expected status the same update applies
    let applied = repo
        .apply_transition(
            session.organization_id,
            id,
            QuoteStatus::Draft,
            QuoteStatus::Sent,
        )
        .await
        .unwrap();
    assert!(applied);

    // And the previous expectation is now stale in turn
    let applied = repo
        .apply_transition(
            session.organization_id,
            id,
            QuoteStatus::Draft,
            QuoteStatus::Sent,
        )
        .await
        .unwrap();
    assert!(!applied);
}

#[tokio::test]
async fn test_conversion_guard_admits_exactly_one_winner() {
    let app = TestApp::new().await;
    let session = default_session(&app).await;
    let quote = create_quote(&app, &session).await;
    let id = Uuid::parse_str(quote["id"].as_str().unwrap()).unwrap();

    let repo = QuoteRepository::new(&app.state.db);
    assert!(repo
        .apply_transition(
            session.organization_id,
            id,
            QuoteStatus::Draft,
            QuoteStatus::Sent,
        )
        .await
        .unwrap());

    // Both callers hold the same pre-conversion snapshot, as two racing
    // requests would after passing the policy check.
    let snapshot = repo
        .get_by_id(session.organization_id, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.status, QuoteStatus::Sent);

    let first = repo
        .convert_to_invoice(session.organization_id, &snapshot)
        .await
        .unwrap();
    let second = repo
        .convert_to_invoice(session.organization_id, &snapshot)
        .await
        .unwrap();

    let invoice = first.expect("first conversion wins");
    assert!(second.is_none(), "losing conversion must produce nothing");

    // The quote links the winner's invoice
    let converted = repo
        .get_by_id(session.organization_id, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(converted.status, QuoteStatus::Converted);
    assert_eq!(converted.converted_invoice_id, Some(invoice.id));

    // Exactly one invoice row exists for this quote
    let invoices = InvoiceRepository::new(&app.state.db)
        .list(session.organization_id)
        .await
        .unwrap();
    let linked: Vec<_> = invoices
        .iter()
        .filter(|i| i.quote_id == Some(id))
        .collect();
    assert_eq!(linked.len(), 1);
}
