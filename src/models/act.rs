//! Work-completion act model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Work-completion act entity
///
/// Acts follow the same exclusive-ownership pattern as quotes and invoices:
/// the organization that created an act owns it, and no other organization
/// may act on it. Unlike quotes, acts expose deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Act {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Human-readable, server-assigned number (e.g. `ACT-2026-0001`)
    pub number: String,
    pub client_name: String,
    pub issue_date: NaiveDate,
    pub currency: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating an act
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActRequest {
    pub client_name: String,
    pub issue_date: NaiveDate,
    pub currency: String,
    pub total: Decimal,
}
