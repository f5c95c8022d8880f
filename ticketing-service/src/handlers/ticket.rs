//! E-ticket purchase and lookup.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{EticketResponse, PurchaseTicketRequest, PurchaseTicketResponse};
use crate::startup::AppState;

/// The issuance operation: debit, e-ticket, counters, projection,
/// notification, email. Typed failures map to 404 (no active card) and
/// 402 (insufficient funds).
pub async fn purchase_eticket(
    State(state): State<AppState>,
    Json(payload): Json<PurchaseTicketRequest>,
) -> Result<Json<PurchaseTicketResponse>, AppError> {
    payload.validate()?;
    if payload.total_fare <= rust_decimal::Decimal::ZERO {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Total fare must be positive"
        )));
    }

    tracing::info!(
        user_id = %payload.user_id,
        booking_reference = %payload.booking_reference,
        total_fare = %payload.total_fare,
        passengers = payload.passengers.len(),
        "Processing e-ticket purchase"
    );

    let receipt = state.issuer.purchase(payload.into()).await?;

    Ok(Json(PurchaseTicketResponse {
        message: "eTicket created successfully".to_string(),
        eticket_id: receipt.eticket_id,
        booking_reference: receipt.booking_reference,
    }))
}

pub async fn get_eticket(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<EticketResponse>, AppError> {
    let ticket = state
        .stores
        .bookings
        .eticket_by_reference(&reference)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("E-ticket not found")))?;
    Ok(Json(ticket.into()))
}
