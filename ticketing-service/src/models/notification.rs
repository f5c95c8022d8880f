//! In-app notification records, written as a side effect of other operations.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ProfileUpdate,
    BookingCreated,
    CardLoaded,
    CardLinked,
    BookingReminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfileUpdate => "profile_update",
            Self::BookingCreated => "booking_created",
            Self::CardLoaded => "card_loaded",
            Self::CardLinked => "card_linked",
            Self::BookingReminder => "booking_reminder",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub user_id: String,
    #[serde(default)]
    pub additional_data: serde_json::Value,
    pub is_read: bool,
    pub is_archived: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_utc: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        user_id: impl Into<String>,
        additional_data: serde_json::Value,
    ) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            user_id: user_id.into(),
            additional_data,
            is_read: false,
            is_archived: false,
            created_utc: Utc::now(),
        }
    }
}
