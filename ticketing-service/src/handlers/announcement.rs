//! Announcement endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{
    AnnouncementQuery, AnnouncementResponse, CreateAnnouncementRequest,
    UpdateAnnouncementStatusRequest, UserIdBody,
};
use crate::models::Announcement;
use crate::startup::AppState;

pub async fn create_announcement(
    State(state): State<AppState>,
    Json(payload): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementResponse>), AppError> {
    payload.validate()?;

    let announcement: Announcement = payload.into();
    state.stores.announcements.create(&announcement).await?;

    tracing::info!(
        announcement_id = %announcement.announcement_id,
        title = %announcement.title,
        author = %announcement.author,
        "Announcement created"
    );

    Ok((StatusCode::CREATED, Json(announcement.into())))
}

/// Active announcements visible to the user, optionally filtered by kind and
/// priority.
pub async fn list_announcements(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<AnnouncementQuery>,
) -> Result<Json<Vec<AnnouncementResponse>>, AppError> {
    let announcements = state
        .stores
        .announcements
        .active_for_user(&user_id, query.kind.as_deref(), query.priority)
        .await?;
    Ok(Json(announcements.into_iter().map(Into::into).collect()))
}

pub async fn mark_announcement_read(
    State(state): State<AppState>,
    Path(announcement_id): Path<String>,
    Json(payload): Json<UserIdBody>,
) -> Result<Json<AnnouncementResponse>, AppError> {
    payload.validate()?;
    let announcement = state
        .stores
        .announcements
        .mark_read(&announcement_id, &payload.user_id)
        .await?;
    Ok(Json(announcement.into()))
}

pub async fn update_announcement_status(
    State(state): State<AppState>,
    Path(announcement_id): Path<String>,
    Json(payload): Json<UpdateAnnouncementStatusRequest>,
) -> Result<Json<AnnouncementResponse>, AppError> {
    let announcement = state
        .stores
        .announcements
        .set_status(
            &announcement_id,
            payload.status,
            payload.is_active.unwrap_or(true),
        )
        .await?;
    Ok(Json(announcement.into()))
}
