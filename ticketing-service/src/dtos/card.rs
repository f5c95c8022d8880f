use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Card, CardStatus, CardUpdate, EntryKind, EntryStatus, LedgerEntry};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCardRequest {
    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "Card number cannot be empty"))]
    pub card_number: String,
    #[validate(length(min = 1, message = "Card type cannot be empty"))]
    pub card_type: String,
}

#[derive(Debug, Deserialize)]
pub struct BuyLoadRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    pub card_type: Option<String>,
    pub status: Option<CardStatus>,
}

impl From<UpdateCardRequest> for CardUpdate {
    fn from(request: UpdateCardRequest) -> Self {
        CardUpdate {
            card_type: request.card_type,
            status: request.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub card_number: String,
    pub balance: Decimal,
    pub card_type: String,
    pub status: CardStatus,
    pub last_active: DateTime<Utc>,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            card_number: card.card_number,
            balance: card.balance,
            card_type: card.card_type,
            status: card.status,
            last_active: card.last_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BuyLoadResponse {
    pub message: String,
    pub new_balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    pub description: String,
    pub date_transaction: DateTime<Utc>,
    pub payment: Decimal,
    pub status: EntryStatus,
    pub kind: EntryKind,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            description: entry.description,
            date_transaction: entry.date_transaction,
            payment: entry.payment,
            status: entry.status,
            kind: entry.kind,
        }
    }
}
