/// Database row records and domain enums
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User identity record
///
/// `password_hash` is empty for federated-only accounts; exactly one
/// authentication path is authoritative per login attempt.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub google_id: Option<String>,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub availability: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Idea,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idea => "Idea",
            Stage::InProgress => "In Progress",
            Stage::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> ApiResult<Self> {
        match s {
            "Idea" => Ok(Stage::Idea),
            "In Progress" => Ok(Stage::InProgress),
            "Completed" => Ok(Stage::Completed),
            _ => Err(ApiError::Validation(format!("Invalid stage: {}", s))),
        }
    }
}

/// Project record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub goals: Option<String>,
    pub category_id: i64,
    pub stage: String,
    pub creator_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A vacancy on a project
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProjectRole {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub required_experience_level: i64,
    pub is_filled: bool,
}

/// Join-request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> ApiResult<Self> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(ApiError::Internal(format!("Invalid request status: {}", s))),
        }
    }

    /// Active requests block further applications to the same role
    pub fn is_active(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Accepted)
    }
}

/// Join application record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reference-data record (categories, technologies, languages, types)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_round_trip() {
        for stage in [Stage::Idea, Stage::InProgress, Stage::Completed] {
            assert_eq!(Stage::parse(stage.as_str()).unwrap(), stage);
        }
        assert!(Stage::parse("Shipped").is_err());
    }

    #[test]
    fn test_request_status_activity() {
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::Accepted.is_active());
        assert!(!RequestStatus::Rejected.is_active());
    }
}
