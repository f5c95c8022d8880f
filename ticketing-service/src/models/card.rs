//! Stored-value card model.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::money::round2;

/// Card lifecycle states. Cards are never deleted, only status-flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Inactive,
    Blocked,
}

impl CardStatus {
    /// Get string representation for database filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Blocked => "blocked",
        }
    }
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored-value card. Exactly one card per user, enforced at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub user_id: String,
    pub card_number: String,
    /// Spendable balance; serialized as a decimal string with 2 dp.
    pub balance: Decimal,
    pub card_type: String,
    pub status: CardStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_active: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_utc: DateTime<Utc>,
}

impl Card {
    pub fn new(user_id: String, card_number: String, card_type: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            card_number,
            balance: round2(Decimal::ZERO),
            card_type,
            status: CardStatus::Active,
            last_active: now,
            created_utc: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CardStatus::Active
    }
}

/// Typed partial update applied through the card-update endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardUpdate {
    pub card_type: Option<String>,
    pub status: Option<CardStatus>,
}

impl CardUpdate {
    pub fn is_empty(&self) -> bool {
        self.card_type.is_none() && self.status.is_none()
    }
}
