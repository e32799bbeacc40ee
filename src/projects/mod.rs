/// Project domain
///
/// Projects, their roles (vacancies) and join requests. All mutation paths
/// are gated on the owning project's creator.

mod manager;
mod requests;
mod roles;

pub use manager::{ProjectFilters, ProjectManager};
pub use requests::RequestManager;
pub use roles::RoleManager;

use crate::{
    db::models::{NamedRef, ProjectRole, Stage},
    error::{ApiError, ApiResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

/// Project create/update request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub goals: Option<String>,
    pub category_id: i64,
    pub stage: Stage,
    #[validate(length(min = 1))]
    pub project_types: Vec<i64>,
    #[serde(default)]
    pub technologies: Vec<i64>,
    #[serde(default)]
    pub languages: Vec<i64>,
}

/// Creator fields embedded in a project view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCreator {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub profile_picture: Option<String>,
    pub availability: bool,
}

/// Full project view with creator, category, tag sets and roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub goals: Option<String>,
    pub stage: Stage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator: ProjectCreator,
    pub category: NamedRef,
    pub types: Vec<NamedRef>,
    pub technologies: Vec<NamedRef>,
    pub languages: Vec<NamedRef>,
    pub roles: Vec<ProjectRole>,
}

/// Role creation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(range(min = 1))]
    pub project_id: i64,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: String,
    pub required_experience_level: i64,
}

/// Role update request
///
/// `is_filled` is deliberately absent; the fill state is owned by the
/// request lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: String,
    pub required_experience_level: i64,
}

/// Reference to a role on a project, used by apply/cancel/withdraw
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestAction {
    #[validate(range(min = 1))]
    pub project_id: i64,
    #[validate(range(min = 1))]
    pub role_id: i64,
}

/// Owner's reply to a join request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReplyRequest {
    #[validate(range(min = 1))]
    pub request_id: i64,
    pub accepted: bool,
}

/// Resolve the creator of a project, or NotFound
pub(crate) async fn project_creator(db: &SqlitePool, project_id: i64) -> ApiResult<i64> {
    sqlx::query_scalar::<_, i64>("SELECT creator_id FROM project WHERE id = ?1")
        .bind(project_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

/// Fail with Forbidden unless `user_id` owns the project
pub(crate) async fn ensure_owner(db: &SqlitePool, project_id: i64, user_id: i64) -> ApiResult<()> {
    if project_creator(db, project_id).await? != user_id {
        return Err(ApiError::Forbidden(
            "Only the project owner may perform this action".to_string(),
        ));
    }

    Ok(())
}
