//! Quote lifecycle service
//!
//! The authority for the quote workflow. Handlers pass user-initiated
//! actions here; this service loads the quote scoped to the caller's
//! organization, consults the transition policy on the model, and applies
//! the change through guarded updates so concurrent mutations have exactly
//! one winner. Illegal transitions come back as conflicts carrying a
//! message the client can surface verbatim.

use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::QuoteRepository;
use crate::models::{Invoice, Quote, QuoteAction};
use crate::utils::{AppError, AppResult};

pub struct LifecycleService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LifecycleService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Perform a plain status transition (`send`, `accept`, `reject`, `expire`)
    ///
    /// Returns the authoritative updated quote. Conversion has its own
    /// operation because it creates an invoice; routing it here is a caller
    /// bug surfaced as a bad request.
    pub async fn perform_action(
        &self,
        organization_id: Uuid,
        quote_id: Uuid,
        action: QuoteAction,
    ) -> AppResult<Quote> {
        let repo = QuoteRepository::new(self.pool);
        let quote = self.load(&repo, organization_id, quote_id).await?;

        if !quote.permits(action) {
            return Err(AppError::conflict(illegal_action_message(&quote, action)));
        }

        match action {
            QuoteAction::Send
            | QuoteAction::Accept
            | QuoteAction::Reject
            | QuoteAction::Expire => {
                let applied = repo
                    .apply_transition(
                        organization_id,
                        quote_id,
                        quote.status,
                        action.target_status(),
                    )
                    .await?;

                if !applied {
                    // The quote changed between the read and the guarded
                    // update; whoever got there first won.
                    return Err(AppError::conflict(
                        "Quote was modified concurrently, refresh and retry",
                    ));
                }

                info!(
                    quote = %quote.number,
                    action = %action,
                    status = %action.target_status(),
                    "Quote transition applied"
                );

                self.load(&repo, organization_id, quote_id).await
            }
            QuoteAction::ConvertToInvoice => Err(AppError::bad_request(
                "convert-to-invoice has a dedicated endpoint",
            )),
        }
    }

    /// Convert a quote into an invoice
    ///
    /// Terminal and irreversible: the quote becomes `CONVERTED` with
    /// `converted_invoice_id` set, and the new invoice is returned. At most
    /// one invoice is ever produced per quote, also under concurrent calls.
    pub async fn convert_to_invoice(
        &self,
        organization_id: Uuid,
        quote_id: Uuid,
    ) -> AppResult<Invoice> {
        let repo = QuoteRepository::new(self.pool);
        let quote = self.load(&repo, organization_id, quote_id).await?;

        if !quote.permits(QuoteAction::ConvertToInvoice) {
            return Err(AppError::conflict(illegal_action_message(
                &quote,
                QuoteAction::ConvertToInvoice,
            )));
        }

        match repo.convert_to_invoice(organization_id, &quote).await? {
            Some(invoice) => {
                info!(
                    quote = %quote.number,
                    invoice = %invoice.number,
                    "Quote converted to invoice"
                );
                Ok(invoice)
            }
            // Lost a conversion race: the other call created the invoice.
            None => Err(AppError::conflict("Quote already converted")),
        }
    }

    async fn load(
        &self,
        repo: &QuoteRepository<'a>,
        organization_id: Uuid,
        quote_id: Uuid,
    ) -> AppResult<Quote> {
        repo.get_by_id(organization_id, quote_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load quote: {}", e);
                AppError::internal("Failed to load quote")
            })?
            .ok_or_else(|| AppError::not_found("Quote not found"))
    }
}

fn illegal_action_message(quote: &Quote, action: QuoteAction) -> String {
    if action == QuoteAction::ConvertToInvoice && quote.converted_invoice_id.is_some() {
        return "Quote already converted".to_string();
    }
    format!(
        "Cannot {} a quote in status {}",
        action.as_str(),
        quote.status
    )
}
