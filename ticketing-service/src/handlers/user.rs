//! User profile endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use service_core::error::AppError;
use validator::Validate;

use crate::dtos::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::models::NotificationKind;
use crate::services::stores::UserUpdate;
use crate::startup::AppState;

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;
    let user = state.stores.users.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .stores
        .users
        .get(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;
    Ok(Json(user.into()))
}

pub async fn edit_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;
    let changes: UserUpdate = payload.into();
    let updated_fields = changes.updated_fields();

    let user = state.stores.users.update(&user_id, changes).await?;

    if !updated_fields.is_empty() {
        state.notifier.emit(
            NotificationKind::ProfileUpdate,
            "Profile Updated",
            format!(
                "Your {} has been updated successfully.",
                updated_fields.join(", ")
            ),
            user_id,
            json!({
                "updatedFields": updated_fields,
                "actionRequired": false,
            }),
        );
    }

    Ok(Json(user.into()))
}
