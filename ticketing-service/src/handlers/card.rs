//! Card endpoints: issue, query, load, update, history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{
    BuyLoadRequest, BuyLoadResponse, CardResponse, CreateCardRequest, LedgerEntryResponse,
    UpdateCardRequest,
};
use crate::models::{money::round2, Card, CardUpdate, LedgerEntry, NotificationKind};
use crate::services::metrics::CARD_LOADS_TOTAL;
use crate::startup::AppState;

pub async fn get_card(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CardResponse>, AppError> {
    let card = state
        .stores
        .ledger
        .get_card(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Card not found")))?;
    Ok(Json(card.into()))
}

pub async fn create_card(
    State(state): State<AppState>,
    Json(payload): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CardResponse>), AppError> {
    payload.validate()?;

    let card = Card::new(payload.user_id, payload.card_number, payload.card_type);
    let card = state.stores.ledger.create_card(card).await?;

    state.notifier.emit(
        NotificationKind::CardLinked,
        "Card Created",
        format!(
            "Your new {} card has been created successfully.",
            card.card_type
        ),
        card.user_id.clone(),
        json!({
            "cardType": card.card_type,
            "cardNumber": card.card_number,
            "actionRequired": false,
        }),
    );

    Ok((StatusCode::CREATED, Json(card.into())))
}

/// Typed partial update, addressed by card number.
pub async fn update_card(
    State(state): State<AppState>,
    Path(card_number): Path<String>,
    Json(payload): Json<UpdateCardRequest>,
) -> Result<Json<CardResponse>, AppError> {
    let update: CardUpdate = payload.into();
    if update.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "No card fields to update"
        )));
    }

    let card = state.stores.ledger.update_card(&card_number, update).await?;

    let suffix: String = card
        .card_number
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    state.notifier.emit(
        NotificationKind::CardLinked,
        "Card Linked",
        format!(
            "Your {} card ending in {} has been linked successfully.",
            card.card_type, suffix
        ),
        card.user_id.clone(),
        json!({
            "cardType": card.card_type,
            "cardNumber": card.card_number,
            "actionRequired": false,
        }),
    );

    Ok(Json(card.into()))
}

pub async fn buy_load(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<BuyLoadRequest>,
) -> Result<Json<BuyLoadResponse>, AppError> {
    if payload.amount <= Decimal::ZERO {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid amount provided"
        )));
    }
    let amount = round2(payload.amount);

    let card = match state.stores.ledger.credit(&user_id, amount).await {
        Ok(card) => card,
        Err(e) => {
            let status = match &e {
                AppError::NotFound(_) => "card_not_found",
                _ => "error",
            };
            CARD_LOADS_TOTAL.with_label_values(&[status]).inc();
            return Err(e);
        }
    };

    let entry = LedgerEntry::load(user_id.clone(), amount, &card.card_type);
    if let Err(e) = state.stores.ledger.append_history(&entry).await {
        tracing::warn!(
            user_id = %user_id,
            amount = %amount,
            "Failed to append load history entry: {}",
            e
        );
    }

    state.notifier.emit(
        NotificationKind::CardLoaded,
        "Card Loaded",
        format!(
            "{} has been loaded to your {} card.",
            amount, card.card_type
        ),
        user_id.clone(),
        json!({
            "amount": amount.to_string(),
            "cardType": card.card_type,
            "actionRequired": false,
        }),
    );

    CARD_LOADS_TOTAL.with_label_values(&["ok"]).inc();
    tracing::info!(
        user_id = %user_id,
        amount = %amount,
        new_balance = %card.balance,
        "Card loaded"
    );

    Ok(Json(BuyLoadResponse {
        message: "Load added successfully".to_string(),
        new_balance: card.balance,
    }))
}

pub async fn card_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<LedgerEntryResponse>>, AppError> {
    let entries = state.stores.ledger.history_for_user(&user_id).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
