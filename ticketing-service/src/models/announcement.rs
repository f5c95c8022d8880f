//! Platform announcements, targeted at all users or a selected set.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl AnnouncementPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AnnouncementPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementStatus {
    Draft,
    Sent,
}

impl AnnouncementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
        }
    }
}

impl std::fmt::Display for AnnouncementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub announcement_id: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub schedule_affected: String,
    pub status: AnnouncementStatus,
    pub author: String,
    /// Empty means the announcement targets every user.
    pub target_users: Vec<String>,
    pub priority: AnnouncementPriority,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_chrono_datetime_as_bson_datetime"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    pub read_by: Vec<String>,
    pub is_active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_utc: DateTime<Utc>,
}

// Helper module for optional DateTime<Utc> as BSON DateTime
mod opt_chrono_datetime_as_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(dt) => {
                let bson_dt = bson::DateTime::from_chrono(*dt);
                bson_dt.serialize(serializer)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<bson::DateTime> = Option::deserialize(deserializer)?;
        Ok(opt.map(|dt| dt.to_chrono()))
    }
}

impl Announcement {
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }

    /// Whether the announcement should currently be shown to the given user.
    pub fn is_visible_to(&self, user_id: &str, now: DateTime<Utc>) -> bool {
        self.status == AnnouncementStatus::Sent
            && self.is_active
            && !self.is_expired(now)
            && (self.target_users.is_empty()
                || self.target_users.iter().any(|u| u == user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement() -> Announcement {
        Announcement {
            announcement_id: Announcement::new_id(),
            title: "Service advisory".to_string(),
            message: "Afternoon sailings delayed".to_string(),
            kind: "general".to_string(),
            schedule_affected: String::new(),
            status: AnnouncementStatus::Sent,
            author: "Operations".to_string(),
            target_users: vec![],
            priority: AnnouncementPriority::Medium,
            expires_at: None,
            read_by: vec![],
            is_active: true,
            created_utc: Utc::now(),
        }
    }

    #[test]
    fn visible_to_everyone_when_untargeted() {
        let a = announcement();
        assert!(a.is_visible_to("U0001", Utc::now()));
    }

    #[test]
    fn hidden_when_targeted_at_someone_else() {
        let mut a = announcement();
        a.target_users = vec!["U0002".to_string()];
        assert!(!a.is_visible_to("U0001", Utc::now()));
        assert!(a.is_visible_to("U0002", Utc::now()));
    }

    #[test]
    fn hidden_once_expired() {
        let mut a = announcement();
        a.expires_at = Some(Utc::now() - chrono::Duration::hours(1));
        assert!(!a.is_visible_to("U0001", Utc::now()));
    }

    #[test]
    fn drafts_are_never_visible() {
        let mut a = announcement();
        a.status = AnnouncementStatus::Draft;
        assert!(!a.is_visible_to("U0001", Utc::now()));
    }
}
