//! Quote model and lifecycle policy
//!
//! A quote is a commercial offer issued by an organization to a client. Its
//! lifecycle is a small state machine: created as a draft, sent to the
//! client, then accepted, rejected or expired, and finally converted into an
//! invoice. Conversion is terminal and irreversible. This module holds the
//! complete transition policy; the HTTP layer and the lifecycle service only
//! ever consult it through [`Quote::permits`] and [`QuoteAction::target_status`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quote lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
    Converted,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "DRAFT",
            QuoteStatus::Sent => "SENT",
            QuoteStatus::Accepted => "ACCEPTED",
            QuoteStatus::Rejected => "REJECTED",
            QuoteStatus::Expired => "EXPIRED",
            QuoteStatus::Converted => "CONVERTED",
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(QuoteStatus::Draft),
            "SENT" => Ok(QuoteStatus::Sent),
            "ACCEPTED" => Ok(QuoteStatus::Accepted),
            "REJECTED" => Ok(QuoteStatus::Rejected),
            "EXPIRED" => Ok(QuoteStatus::Expired),
            "CONVERTED" => Ok(QuoteStatus::Converted),
            _ => Err(format!("Invalid quote status: {}", s)),
        }
    }
}

/// User-initiated quote action
///
/// A closed tagged union rather than a free-form string: the HTTP path
/// segment parses into this enum, and every dispatch site is an exhaustive
/// match, so adding an action is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteAction {
    Send,
    Accept,
    Reject,
    Expire,
    ConvertToInvoice,
}

impl QuoteAction {
    pub const ALL: [QuoteAction; 5] = [
        QuoteAction::Send,
        QuoteAction::Accept,
        QuoteAction::Reject,
        QuoteAction::Expire,
        QuoteAction::ConvertToInvoice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteAction::Send => "send",
            QuoteAction::Accept => "accept",
            QuoteAction::Reject => "reject",
            QuoteAction::Expire => "expire",
            QuoteAction::ConvertToInvoice => "convert-to-invoice",
        }
    }

    /// The status a quote ends up in after this action succeeds
    pub fn target_status(&self) -> QuoteStatus {
        match self {
            QuoteAction::Send => QuoteStatus::Sent,
            QuoteAction::Accept => QuoteStatus::Accepted,
            QuoteAction::Reject => QuoteStatus::Rejected,
            QuoteAction::Expire => QuoteStatus::Expired,
            QuoteAction::ConvertToInvoice => QuoteStatus::Converted,
        }
    }
}

impl std::fmt::Display for QuoteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuoteAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "send" => Ok(QuoteAction::Send),
            "accept" => Ok(QuoteAction::Accept),
            "reject" => Ok(QuoteAction::Reject),
            "expire" => Ok(QuoteAction::Expire),
            "convert-to-invoice" => Ok(QuoteAction::ConvertToInvoice),
            _ => Err(format!("Invalid quote action: {}", s)),
        }
    }
}

/// Quote entity
///
/// Invariant: `converted_invoice_id` is set if and only if the status is
/// `CONVERTED`. Monetary totals serialize as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Human-readable, server-assigned number (e.g. `Q-2026-0001`)
    pub number: String,
    pub client_name: String,
    pub issue_date: NaiveDate,
    /// Date the offer stops being valid ("valid until"), if any
    pub valid_until: Option<NaiveDate>,
    pub currency: String,
    pub total: Decimal,
    pub status: QuoteStatus,
    pub converted_invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Whether the given action is legal for this quote's current state
    ///
    /// Conversion is deliberately permitted from `SENT`, not only
    /// `ACCEPTED`: the issuing organization may convert an offer the client
    /// has not formally accepted yet. Do not tighten this to require
    /// `ACCEPTED`.
    pub fn permits(&self, action: QuoteAction) -> bool {
        match action {
            QuoteAction::Send => self.status == QuoteStatus::Draft,
            QuoteAction::Accept | QuoteAction::Reject | QuoteAction::Expire => {
                self.status == QuoteStatus::Sent
            }
            QuoteAction::ConvertToInvoice => {
                matches!(self.status, QuoteStatus::Sent | QuoteStatus::Accepted)
                    && self.converted_invoice_id.is_none()
            }
        }
    }

    /// All actions currently legal for this quote
    pub fn allowed_actions(&self) -> Vec<QuoteAction> {
        QuoteAction::ALL
            .iter()
            .copied()
            .filter(|action| self.permits(*action))
            .collect()
    }
}

/// Request payload for creating a draft quote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub client_name: String,
    pub issue_date: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub currency: String,
    /// Decimal string, e.g. `"1299.99"`
    pub total: Decimal,
}
