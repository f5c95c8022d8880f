use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Announcement, AnnouncementPriority, AnnouncementStatus};

fn default_kind() -> String {
    "general".to_string()
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub schedule_affected: String,
    pub status: Option<AnnouncementStatus>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: String,
    #[serde(default)]
    pub target_users: Vec<String>,
    pub priority: Option<AnnouncementPriority>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreateAnnouncementRequest> for Announcement {
    fn from(request: CreateAnnouncementRequest) -> Self {
        Announcement {
            announcement_id: Announcement::new_id(),
            title: request.title,
            message: request.message,
            kind: request.kind,
            schedule_affected: request.schedule_affected,
            status: request.status.unwrap_or(AnnouncementStatus::Draft),
            author: request.author,
            target_users: request.target_users,
            priority: request.priority.unwrap_or(AnnouncementPriority::Medium),
            expires_at: request.expires_at,
            read_by: vec![],
            is_active: true,
            created_utc: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAnnouncementStatusRequest {
    pub status: AnnouncementStatus,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AnnouncementQuery {
    pub kind: Option<String>,
    pub priority: Option<AnnouncementPriority>,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementResponse {
    pub announcement_id: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub schedule_affected: String,
    pub status: AnnouncementStatus,
    pub author: String,
    pub target_users: Vec<String>,
    pub priority: AnnouncementPriority,
    pub expires_at: Option<DateTime<Utc>>,
    pub read_by: Vec<String>,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
}

impl From<Announcement> for AnnouncementResponse {
    fn from(announcement: Announcement) -> Self {
        Self {
            announcement_id: announcement.announcement_id,
            title: announcement.title,
            message: announcement.message,
            kind: announcement.kind,
            schedule_affected: announcement.schedule_affected,
            status: announcement.status,
            author: announcement.author,
            target_users: announcement.target_users,
            priority: announcement.priority,
            expires_at: announcement.expires_at,
            read_by: announcement.read_by,
            is_active: announcement.is_active,
            created_utc: announcement.created_utc,
        }
    }
}
