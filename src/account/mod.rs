/// Account management
///
/// Signup, password and federated login, token refresh, and user CRUD.

mod manager;

pub use manager::AccountManager;

use crate::db::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 4))]
    pub username: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// A freshly issued access + refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Login response: token pair plus public profile fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh request body, used when the refresh cookie is absent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Profile view of a user
///
/// Email and federated id are only disclosed on the owner view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub profile_picture: Option<String>,
    pub availability: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
}

impl UserProfile {
    /// View visible to any caller
    pub fn public(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            profile_picture: user.profile_picture.clone(),
            availability: user.availability,
            created_at: user.created_at,
            email: None,
            google_id: None,
        }
    }

    /// View visible to the account owner
    pub fn owner(user: &User) -> Self {
        Self {
            email: Some(user.email.clone()),
            google_id: user.google_id.clone(),
            ..Self::public(user)
        }
    }
}

/// Profile update request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub profile_picture: Option<String>,
    pub availability: bool,
}
