//! Database layer
//!
//! SQLite-backed storage for organizations, users, membership, and the
//! business documents (quotes, invoices, acts). One repository per
//! aggregate; rows are stored with string-typed ids, dates and totals and
//! mapped into domain types here.

mod act_repository;
mod invoice_repository;
mod organization_repository;
mod quote_repository;
mod user_repository;

pub use act_repository::ActRepository;
pub use invoice_repository::InvoiceRepository;
pub use organization_repository::OrganizationRepository;
pub use quote_repository::QuoteRepository;
pub use user_repository::UserRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::config::DatabaseConfig;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

// Row-mapping helpers shared by the repositories.

pub(crate) fn parse_db_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("Invalid UUID in database: {}", value))
}

pub(crate) fn parse_db_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp in database: {}", value))
}

pub(crate) fn parse_db_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date in database: {}", value))
}

pub(crate) fn parse_db_decimal(value: &str) -> Result<Decimal> {
    value
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal in database: {}", value))
}

/// Reserve the next value of a per-organization, per-year document counter
///
/// The upsert is atomic, so two concurrent creations never observe the same
/// value. Callers run this inside the transaction that inserts the numbered
/// document; a failed insert rolls the reservation back with it.
pub(crate) async fn next_document_number<'e, E>(
    executor: E,
    organization_id: Uuid,
    kind: &str,
    prefix: &str,
) -> Result<String>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let year = chrono::Datelike::year(&Utc::now());
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO document_counters (organization_id, kind, year, value)
        VALUES (?, ?, ?, 1)
        ON CONFLICT (organization_id, kind, year)
        DO UPDATE SET value = value + 1
        RETURNING value
        "#,
    )
    .bind(organization_id.to_string())
    .bind(kind)
    .bind(year)
    .fetch_one(executor)
    .await
    .context("Failed to reserve document number")?;

    Ok(format!("{}-{}-{:04}", prefix, year, row.0))
}
