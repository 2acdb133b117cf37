//! Work-completion act repository

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{
    next_document_number, parse_db_date, parse_db_decimal, parse_db_timestamp, parse_db_uuid,
};
use crate::models::{Act, CreateActRequest};

#[derive(Debug, sqlx::FromRow)]
struct ActRow {
    id: String,
    organization_id: String,
    number: String,
    client_name: String,
    issue_date: String,
    currency: String,
    total: String,
    created_at: String,
    updated_at: String,
}

const ACT_COLUMNS: &str =
    "id, organization_id, number, client_name, issue_date, currency, total, created_at, updated_at";

pub struct ActRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ActRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<Act>> {
        let rows = sqlx::query_as::<_, ActRow>(&format!(
            "SELECT {} FROM acts WHERE organization_id = ? ORDER BY created_at DESC, number DESC",
            ACT_COLUMNS
        ))
        .bind(organization_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list acts")?;

        rows.into_iter().map(row_to_act).collect()
    }

    pub async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Act>> {
        let row = sqlx::query_as::<_, ActRow>(&format!(
            "SELECT {} FROM acts WHERE id = ? AND organization_id = ?",
            ACT_COLUMNS
        ))
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get act")?;

        row.map(row_to_act).transpose()
    }

    pub async fn create(&self, organization_id: Uuid, req: &CreateActRequest) -> Result<Act> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        // Number reservation and insert commit together, so a failed insert
        // does not consume a number.
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin act creation transaction")?;
        let number = next_document_number(&mut *tx, organization_id, "act", "ACT").await?;

        sqlx::query(
            r#"
            INSERT INTO acts (id, organization_id, number, client_name, issue_date,
                              currency, total, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(&number)
        .bind(&req.client_name)
        .bind(req.issue_date.format("%Y-%m-%d").to_string())
        .bind(&req.currency)
        .bind(req.total.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Failed to create act")?;

        tx.commit()
            .await
            .context("Failed to commit act creation")?;

        self.get_by_id(organization_id, id)
            .await?
            .context("Failed to retrieve created act")
    }

    /// Delete an act; returns `false` when no owned act matched
    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM acts WHERE id = ? AND organization_id = ?")
            .bind(id.to_string())
            .bind(organization_id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete act")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_act(row: ActRow) -> Result<Act> {
    Ok(Act {
        id: parse_db_uuid(&row.id)?,
        organization_id: parse_db_uuid(&row.organization_id)?,
        number: row.number,
        client_name: row.client_name,
        issue_date: parse_db_date(&row.issue_date)?,
        currency: row.currency,
        total: parse_db_decimal(&row.total)?,
        created_at: parse_db_timestamp(&row.created_at)?,
        updated_at: parse_db_timestamp(&row.updated_at)?,
    })
}
