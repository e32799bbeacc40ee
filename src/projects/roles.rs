/// Project role manager
///
/// Vacancy CRUD, gated on the parent project's owner. The fill state is not
/// writable here; accept/withdraw own it.
use crate::{
    db::models::ProjectRole,
    error::{ApiError, ApiResult},
    projects::{ensure_owner, CreateRoleRequest, UpdateRoleRequest},
};
use sqlx::SqlitePool;

/// Role manager service
pub struct RoleManager {
    db: SqlitePool,
}

impl RoleManager {
    /// Create a new role manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a role on a project; owner only
    pub async fn create(&self, user_id: i64, req: &CreateRoleRequest) -> ApiResult<ProjectRole> {
        ensure_owner(&self.db, req.project_id, user_id).await?;

        let result = sqlx::query(
            "INSERT INTO project_role (project_id, title, description, required_experience_level, is_filled)
             VALUES (?1, ?2, ?3, ?4, 0)",
        )
        .bind(req.project_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.required_experience_level)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        self.get(result.last_insert_rowid()).await
    }

    /// Get a role by id
    pub async fn get(&self, id: i64) -> ApiResult<ProjectRole> {
        sqlx::query_as::<_, ProjectRole>("SELECT * FROM project_role WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))
    }

    /// Update a role's descriptive fields; owner only
    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        req: &UpdateRoleRequest,
    ) -> ApiResult<ProjectRole> {
        let role = self.get(id).await?;
        ensure_owner(&self.db, role.project_id, user_id).await?;

        sqlx::query(
            "UPDATE project_role SET title = ?1, description = ?2, required_experience_level = ?3
             WHERE id = ?4",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.required_experience_level)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        self.get(id).await
    }

    /// Delete a role; owner only
    pub async fn delete(&self, user_id: i64, id: i64) -> ApiResult<()> {
        let role = self.get(id).await?;
        ensure_owner(&self.db, role.project_id, user_id).await?;

        sqlx::query("DELETE FROM project_role WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(())
    }
}
