use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Notification, NotificationKind};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    pub kind: NotificationKind,
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,
    #[serde(default)]
    pub additional_data: serde_json::Value,
}

/// The acting user, passed in the body on the read/archive/delete routes.
#[derive(Debug, Deserialize, Validate)]
pub struct UserIdBody {
    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub notification_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub user_id: String,
    pub additional_data: serde_json::Value,
    pub is_read: bool,
    pub is_archived: bool,
    pub created_utc: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            notification_id: notification.notification_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            user_id: notification.user_id,
            additional_data: notification.additional_data,
            is_read: notification.is_read,
            is_archived: notification.is_archived,
            created_utc: notification.created_utc,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}
