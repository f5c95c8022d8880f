//! Dashboard view over the denormalized booking projection.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::dtos::ActiveBookingResponse;
use crate::startup::AppState;

pub async fn active_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ActiveBookingResponse>>, AppError> {
    let bookings = state
        .stores
        .bookings
        .active_bookings_for_user(&user_id)
        .await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}
