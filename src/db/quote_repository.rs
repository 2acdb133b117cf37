//! Quote repository
//!
//! Every query is scoped by organization: a quote belonging to another
//! organization behaves exactly like a missing one. Status transitions use
//! compare-and-swap updates so that two racing mutations cannot both
//! succeed, and conversion creates the invoice inside the same transaction
//! that marks the quote converted.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{
    next_document_number, parse_db_date, parse_db_decimal, parse_db_timestamp, parse_db_uuid,
};
use crate::models::{
    CreateQuoteRequest, Invoice, InvoiceStatus, Quote, QuoteStatus,
};

#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    id: String,
    organization_id: String,
    number: String,
    client_name: String,
    issue_date: String,
    valid_until: Option<String>,
    currency: String,
    total: String,
    status: String,
    converted_invoice_id: Option<String>,
    created_at: String,
    updated_at: String,
}

const QUOTE_COLUMNS: &str = "id, organization_id, number, client_name, issue_date, valid_until, \
     currency, total, status, converted_invoice_id, created_at, updated_at";

pub struct QuoteRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> QuoteRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<Quote>> {
        let rows = sqlx::query_as::<_, QuoteRow>(&format!(
            "SELECT {} FROM quotes WHERE organization_id = ? ORDER BY created_at DESC, number DESC",
            QUOTE_COLUMNS
        ))
        .bind(organization_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list quotes")?;

        rows.into_iter().map(row_to_quote).collect()
    }

    pub async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Quote>> {
        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            "SELECT {} FROM quotes WHERE id = ? AND organization_id = ?",
            QUOTE_COLUMNS
        ))
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get quote")?;

        row.map(row_to_quote).transpose()
    }

    pub async fn create(&self, organization_id: Uuid, req: &CreateQuoteRequest) -> Result<Quote> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        // Number reservation and insert commit together, so a failed insert
        // does not consume a number.
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin quote creation transaction")?;
        let number = next_document_number(&mut *tx, organization_id, "quote", "Q").await?;

        sqlx::query(
            r#"
            INSERT INTO quotes (id, organization_id, number, client_name, issue_date,
                                valid_until, currency, total, status, converted_invoice_id,
                                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(&number)
        .bind(&req.client_name)
        .bind(req.issue_date.format("%Y-%m-%d").to_string())
        .bind(req.valid_until.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(&req.currency)
        .bind(req.total.to_string())
        .bind(QuoteStatus::Draft.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Failed to create quote")?;

        tx.commit()
            .await
            .context("Failed to commit quote creation")?;

        self.get_by_id(organization_id, id)
            .await?
            .context("Failed to retrieve created quote")
    }

    /// Apply a plain status transition, guarded by the expected current status
    ///
    /// Returns `false` when the quote was not in `from` anymore (or already
    /// had an invoice linked) by the time the update ran; the caller decides
    /// how to surface the stale state.
    pub async fn apply_transition(
        &self,
        organization_id: Uuid,
        id: Uuid,
        from: QuoteStatus,
        to: QuoteStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE quotes
            SET status = ?, updated_at = ?
            WHERE id = ? AND organization_id = ? AND status = ?
              AND converted_invoice_id IS NULL
            "#,
        )
        .bind(to.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(from.as_str())
        .execute(self.pool)
        .await
        .context("Failed to update quote status")?;

        Ok(result.rows_affected() > 0)
    }

    /// Convert a quote into an invoice
    ///
    /// The quote is marked `CONVERTED` and the invoice is inserted in a
    /// single transaction. The guarded update admits exactly one winner, so
    /// simultaneous conversions of the same quote produce one invoice;
    /// `Ok(None)` means this call lost the race or the quote was no longer
    /// convertible.
    pub async fn convert_to_invoice(
        &self,
        organization_id: Uuid,
        quote: &Quote,
    ) -> Result<Option<Invoice>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin conversion transaction")?;

        let invoice_id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        let updated = sqlx::query(
            r#"
            UPDATE quotes
            SET status = ?, converted_invoice_id = ?, updated_at = ?
            WHERE id = ? AND organization_id = ?
              AND status IN (?, ?)
              AND converted_invoice_id IS NULL
            "#,
        )
        .bind(QuoteStatus::Converted.as_str())
        .bind(invoice_id.to_string())
        .bind(&now)
        .bind(quote.id.to_string())
        .bind(organization_id.to_string())
        .bind(QuoteStatus::Sent.as_str())
        .bind(QuoteStatus::Accepted.as_str())
        .execute(&mut *tx)
        .await
        .context("Failed to mark quote converted")?;

        if updated.rows_affected() == 0 {
            tx.rollback()
                .await
                .context("Failed to roll back conversion")?;
            return Ok(None);
        }

        let number = next_document_number(&mut *tx, organization_id, "invoice", "INV").await?;
        let issue_date = Utc::now().date_naive();

        sqlx::query(
            r#"
            INSERT INTO invoices (id, organization_id, quote_id, number, client_name,
                                  issue_date, due_date, currency, total, status,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(invoice_id.to_string())
        .bind(organization_id.to_string())
        .bind(quote.id.to_string())
        .bind(&number)
        .bind(&quote.client_name)
        .bind(issue_date.format("%Y-%m-%d").to_string())
        .bind(&quote.currency)
        .bind(quote.total.to_string())
        .bind(InvoiceStatus::Draft.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Failed to insert converted invoice")?;

        tx.commit()
            .await
            .context("Failed to commit conversion transaction")?;

        Ok(Some(Invoice {
            id: invoice_id,
            organization_id,
            quote_id: Some(quote.id),
            number,
            client_name: quote.client_name.clone(),
            issue_date,
            due_date: None,
            currency: quote.currency.clone(),
            total: quote.total,
            status: InvoiceStatus::Draft,
            created_at: parse_db_timestamp(&now)?,
            updated_at: parse_db_timestamp(&now)?,
        }))
    }
}

fn row_to_quote(row: QuoteRow) -> Result<Quote> {
    Ok(Quote {
        id: parse_db_uuid(&row.id)?,
        organization_id: parse_db_uuid(&row.organization_id)?,
        number: row.number,
        client_name: row.client_name,
        issue_date: parse_db_date(&row.issue_date)?,
        valid_until: row.valid_until.as_deref().map(parse_db_date).transpose()?,
        currency: row.currency,
        total: parse_db_decimal(&row.total)?,
        status: row
            .status
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        converted_invoice_id: row
            .converted_invoice_id
            .as_deref()
            .map(parse_db_uuid)
            .transpose()?,
        created_at: parse_db_timestamp(&row.created_at)?,
        updated_at: parse_db_timestamp(&row.updated_at)?,
    })
}
