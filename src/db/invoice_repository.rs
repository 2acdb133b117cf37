//! Invoice repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{
    next_document_number, parse_db_date, parse_db_decimal, parse_db_timestamp, parse_db_uuid,
};
use crate::models::{CreateInvoiceRequest, Invoice, InvoiceStatus};

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    organization_id: String,
    quote_id: Option<String>,
    number: String,
    client_name: String,
    issue_date: String,
    due_date: Option<String>,
    currency: String,
    total: String,
    status: String,
    created_at: String,
    updated_at: String,
}

const INVOICE_COLUMNS: &str = "id, organization_id, quote_id, number, client_name, issue_date, \
     due_date, currency, total, status, created_at, updated_at";

pub struct InvoiceRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InvoiceRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoices WHERE organization_id = ? ORDER BY created_at DESC, number DESC",
            INVOICE_COLUMNS
        ))
        .bind(organization_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list invoices")?;

        rows.into_iter().map(row_to_invoice).collect()
    }

    pub async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {} FROM invoices WHERE id = ? AND organization_id = ?",
            INVOICE_COLUMNS
        ))
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get invoice")?;

        row.map(row_to_invoice).transpose()
    }

    pub async fn create(
        &self,
        organization_id: Uuid,
        req: &CreateInvoiceRequest,
    ) -> Result<Invoice> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        // Number reservation and insert commit together, so a failed insert
        // does not consume a number.
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin invoice creation transaction")?;
        let number = next_document_number(&mut *tx, organization_id, "invoice", "INV").await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (id, organization_id, quote_id, number, client_name,
                                  issue_date, due_date, currency, total, status,
                                  created_at, updated_at)
            VALUES (?, ?, NULL, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(&number)
        .bind(&req.client_name)
        .bind(req.issue_date.format("%Y-%m-%d").to_string())
        .bind(req.due_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(&req.currency)
        .bind(req.total.to_string())
        .bind(InvoiceStatus::Draft.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Failed to create invoice")?;

        tx.commit()
            .await
            .context("Failed to commit invoice creation")?;

        self.get_by_id(organization_id, id)
            .await?
            .context("Failed to retrieve created invoice")
    }
}

fn row_to_invoice(row: InvoiceRow) -> Result<Invoice> {
    Ok(Invoice {
        id: parse_db_uuid(&row.id)?,
        organization_id: parse_db_uuid(&row.organization_id)?,
        quote_id: row.quote_id.as_deref().map(parse_db_uuid).transpose()?,
        number: row.number,
        client_name: row.client_name,
        issue_date: parse_db_date(&row.issue_date)?,
        due_date: row.due_date.as_deref().map(parse_db_date).transpose()?,
        currency: row.currency,
        total: parse_db_decimal(&row.total)?,
        status: row
            .status
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?,
        created_at: parse_db_timestamp(&row.created_at)?,
        updated_at: parse_db_timestamp(&row.updated_at)?,
    })
}
