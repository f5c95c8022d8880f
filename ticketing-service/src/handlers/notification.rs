//! Notification read-side CRUD. Writes on this surface go straight to the
//! store so failures surface to the caller; side-effect notifications from
//! other operations go through the emitter instead.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{
    CreateNotificationRequest, NotificationResponse, UnreadCountResponse, UserIdBody,
};
use crate::models::Notification;
use crate::startup::AppState;

pub async fn create_notification(
    State(state): State<AppState>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>), AppError> {
    payload.validate()?;

    let notification = Notification::new(
        payload.kind,
        payload.title,
        payload.message,
        payload.user_id,
        payload.additional_data,
    );
    state.stores.notifications.insert(&notification).await?;

    tracing::info!(
        notification_id = %notification.notification_id,
        user_id = %notification.user_id,
        "Notification created"
    );

    Ok((StatusCode::CREATED, Json(notification.into())))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = state
        .stores
        .notifications
        .list_for_user(&user_id, false)
        .await?;
    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

pub async fn archived_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = state
        .stores
        .notifications
        .list_for_user(&user_id, true)
        .await?;
    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let unread_count = state.stores.notifications.unread_count(&user_id).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
    Json(payload): Json<UserIdBody>,
) -> Result<Json<NotificationResponse>, AppError> {
    payload.validate()?;
    let notification = state
        .stores
        .notifications
        .mark_read(&notification_id, &payload.user_id)
        .await?;
    Ok(Json(notification.into()))
}

pub async fn archive_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
    Json(payload): Json<UserIdBody>,
) -> Result<Json<NotificationResponse>, AppError> {
    payload.validate()?;
    let notification = state
        .stores
        .notifications
        .archive(&notification_id, &payload.user_id)
        .await?;
    Ok(Json(notification.into()))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
    Json(payload): Json<UserIdBody>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    state
        .stores
        .notifications
        .delete(&notification_id, &payload.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
