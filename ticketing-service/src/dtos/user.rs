use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{User, UserStatus};
use crate::services::stores::{NewUser, UserUpdate};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 7, message = "Phone number is too short"))]
    pub phone: String,
    pub birthdate: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        NewUser {
            name: format!("{} {}", request.first_name, request.last_name),
            email: request.email,
            phone: request.phone,
            birthdate: request.birthdate,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(request: UpdateUserRequest) -> Self {
        UserUpdate {
            name: request.name,
            email: request.email,
            phone: request.phone,
            birthdate: request.birthdate,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birthdate: Option<String>,
    pub status: UserStatus,
    pub created_utc: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            birthdate: user.birthdate,
            status: user.status,
            created_utc: user.created_utc,
        }
    }
}
