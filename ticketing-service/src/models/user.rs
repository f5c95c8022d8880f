//! User profile. No credentials are stored here; authentication is handled
//! outside this service.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Sequential public id of the form `U0001`.
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birthdate: Option<String>,
    pub status: UserStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_utc: DateTime<Utc>,
}

impl User {
    /// Format the next sequential user id given the highest existing one.
    pub fn next_user_id(last: Option<&str>) -> String {
        let next = last
            .and_then(|id| id.strip_prefix('U'))
            .and_then(|digits| digits.parse::<u32>().ok())
            .map(|n| n + 1)
            .unwrap_or(1);
        format!("U{:04}", next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_user_id_starts_at_one() {
        assert_eq!(User::next_user_id(None), "U0001");
    }

    #[test]
    fn next_user_id_increments() {
        assert_eq!(User::next_user_id(Some("U0041")), "U0042");
    }

    #[test]
    fn next_user_id_grows_past_four_digits() {
        assert_eq!(User::next_user_id(Some("U9999")), "U10000");
    }
}
