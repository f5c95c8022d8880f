//! Append-only card transaction history.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::money::round2;

/// What kind of balance-affecting event an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Load,
    Purchase,
    Refund,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Purchase => "purchase",
            Self::Refund => "refund",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Confirmed,
    Reversed,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Reversed => "reversed",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single immutable history entry. Created by both the load and the purchase
/// paths; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: String,
    pub user_id: String,
    pub description: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date_transaction: DateTime<Utc>,
    /// Amount moved by the event; serialized as a decimal string with 2 dp.
    pub payment: Decimal,
    pub status: EntryStatus,
    pub kind: EntryKind,
}

impl LedgerEntry {
    fn new(user_id: String, description: String, payment: Decimal, kind: EntryKind) -> Self {
        Self {
            entry_id: Uuid::new_v4().to_string(),
            user_id,
            description,
            date_transaction: Utc::now(),
            payment: round2(payment),
            status: EntryStatus::Confirmed,
            kind,
        }
    }

    pub fn load(user_id: String, amount: Decimal, card_type: &str) -> Self {
        Self::new(
            user_id,
            format!("Load to {} card", card_type),
            amount,
            EntryKind::Load,
        )
    }

    pub fn purchase(user_id: String, amount: Decimal, booking_reference: &str) -> Self {
        Self::new(
            user_id,
            format!("E-ticket purchase {}", booking_reference),
            amount,
            EntryKind::Purchase,
        )
    }

    pub fn refund(user_id: String, amount: Decimal, booking_reference: &str) -> Self {
        Self::new(
            user_id,
            format!("Refund for failed booking {}", booking_reference),
            amount,
            EntryKind::Refund,
        )
    }
}
