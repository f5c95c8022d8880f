//! Schedule listing and per-sailing manifest.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::dtos::ActiveBookingResponse;
use crate::models::Schedule;
use crate::startup::AppState;

pub async fn list_schedules(
    State(state): State<AppState>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let schedules = state.stores.capacity.list_schedules().await?;
    Ok(Json(schedules))
}

/// Bookings made against a sailing, for boarding manifests.
pub async fn schedule_manifest(
    State(state): State<AppState>,
    Path(schedcde): Path<String>,
) -> Result<Json<Vec<ActiveBookingResponse>>, AppError> {
    let schedule = state
        .stores
        .capacity
        .get_schedule(&schedcde)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Schedule not found")))?;

    let bookings = state
        .stores
        .bookings
        .bookings_for_schedule(&schedule.shipping_line, &schedule.depart_date)
        .await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}
