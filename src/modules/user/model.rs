use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::UserEntity;

#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(length(min = 3, message = "Username must be at least 3 characters long"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    #[validate(length(min = 3, message = "Username must be at least 3 characters long"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

pub struct InsertUser {
    pub username: String,
    pub email: String,
    pub hash_password: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub id: uuid::Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
}

/// Identity attributes handed to workflow steps.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: uuid::Uuid,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
    pub date_created: chrono::DateTime<chrono::Utc>,
    pub date_last_modified: chrono::DateTime<chrono::Utc>,
}

impl From<UserEntity> for UserInfo {
    fn from(entity: UserEntity) -> Self {
        UserInfo {
            id: entity.id,
            email: entity.email,
            name: entity.name,
            email_verified: entity.email_verified,
            date_created: entity.created_at,
            date_last_modified: entity.updated_at,
        }
    }
}
