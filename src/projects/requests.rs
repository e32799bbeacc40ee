/// Join-request manager
///
/// The request lifecycle lives here, not in the storage layer: at most one
/// active (pending or accepted) request per (user, project, role), applicant
/// rights for cancel/withdraw, owner rights for reply, and the role
/// fill-state transitions tied to accept and withdraw.
use crate::{
    db::models::{ProjectRequest, ProjectRole, RequestStatus},
    error::{ApiError, ApiResult},
    projects::{ensure_owner, project_creator, ReplyRequest, RequestAction},
};
use chrono::Utc;
use sqlx::SqlitePool;

/// Request manager service
pub struct RequestManager {
    db: SqlitePool,
}

impl RequestManager {
    /// Create a new request manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// List the requests targeting a project; owner only
    pub async fn list_for_project(
        &self,
        user_id: i64,
        project_id: i64,
    ) -> ApiResult<Vec<ProjectRequest>> {
        ensure_owner(&self.db, project_id, user_id).await?;

        sqlx::query_as::<_, ProjectRequest>(
            "SELECT * FROM project_request WHERE project_id = ?1 ORDER BY created_at",
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)
    }

    /// Apply to a role on a project
    ///
    /// Rejected when an active request already exists for this
    /// (user, project, role) triple; a withdrawn or rejected one does not
    /// block a fresh application.
    pub async fn apply(&self, user_id: i64, action: &RequestAction) -> ApiResult<ProjectRequest> {
        let role = sqlx::query_as::<_, ProjectRole>("SELECT * FROM project_role WHERE id = ?1")
            .bind(action.role_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;

        if role.project_id != action.project_id {
            return Err(ApiError::NotFound(
                "Role not found on this project".to_string(),
            ));
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM project_request
             WHERE user_id = ?1 AND project_id = ?2 AND role_id = ?3
               AND status IN ('pending', 'accepted')",
        )
        .bind(user_id)
        .bind(action.project_id)
        .bind(action.role_id)
        .fetch_one(&self.db)
        .await
        .map_err(ApiError::Database)?;

        if active > 0 {
            return Err(ApiError::Conflict("Request already exists".to_string()));
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO project_request (project_id, user_id, role_id, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'pending', ?4, ?5)",
        )
        .bind(action.project_id)
        .bind(user_id)
        .bind(action.role_id)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        tracing::info!(user_id, project_id = action.project_id, role_id = action.role_id, "applied to project");
        self.get(result.last_insert_rowid()).await
    }

    /// Cancel the applicant's own pending request
    pub async fn cancel(&self, user_id: i64, action: &RequestAction) -> ApiResult<()> {
        let request = self
            .find_by_triple(user_id, action, &[RequestStatus::Pending])
            .await?
            .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

        sqlx::query("DELETE FROM project_request WHERE id = ?1")
            .bind(request.id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(())
    }

    /// Withdraw the applicant's own pending or accepted request
    ///
    /// Withdrawing an accepted request reopens the role, in the same
    /// transaction as the request removal.
    pub async fn withdraw(&self, user_id: i64, action: &RequestAction) -> ApiResult<()> {
        let request = self
            .find_by_triple(
                user_id,
                action,
                &[RequestStatus::Pending, RequestStatus::Accepted],
            )
            .await?
            .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;

        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        sqlx::query("DELETE FROM project_request WHERE id = ?1")
            .bind(request.id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::Database)?;

        if RequestStatus::parse(&request.status)? == RequestStatus::Accepted {
            sqlx::query("UPDATE project_role SET is_filled = 0 WHERE id = ?1")
                .bind(request.role_id)
                .execute(&mut *tx)
                .await
                .map_err(ApiError::Database)?;
        }

        tx.commit().await.map_err(ApiError::Database)?;

        tracing::info!(user_id, request_id = request.id, "withdrew from project");
        Ok(())
    }

    /// Accept or reject a pending request; project owner only
    ///
    /// Accepting fills the role with a guarded update: a role that is
    /// already filled fails the whole reply, so two concurrent accepts
    /// cannot both succeed.
    pub async fn reply(&self, user_id: i64, reply: &ReplyRequest) -> ApiResult<ProjectRequest> {
        let request = self.get(reply.request_id).await?;

        let creator_id = project_creator(&self.db, request.project_id).await?;
        if creator_id != user_id {
            return Err(ApiError::Forbidden(
                "Only the project owner may reply to requests".to_string(),
            ));
        }

        let status = if reply.accepted {
            RequestStatus::Accepted
        } else {
            RequestStatus::Rejected
        };

        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        let updated = sqlx::query(
            "UPDATE project_request SET status = ?1, updated_at = ?2
             WHERE id = ?3 AND status = 'pending'",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(request.id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::Database)?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::Conflict("Request already resolved".to_string()));
        }

        if reply.accepted {
            let filled = sqlx::query(
                "UPDATE project_role SET is_filled = 1 WHERE id = ?1 AND is_filled = 0",
            )
            .bind(request.role_id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::Database)?;

            if filled.rows_affected() == 0 {
                return Err(ApiError::Conflict("Role already filled".to_string()));
            }
        }

        tx.commit().await.map_err(ApiError::Database)?;

        tracing::info!(
            request_id = request.id,
            accepted = reply.accepted,
            "replied to request"
        );
        self.get(request.id).await
    }

    /// Get a request by id
    pub async fn get(&self, id: i64) -> ApiResult<ProjectRequest> {
        sqlx::query_as::<_, ProjectRequest>("SELECT * FROM project_request WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))
    }

    async fn find_by_triple(
        &self,
        user_id: i64,
        action: &RequestAction,
        statuses: &[RequestStatus],
    ) -> ApiResult<Option<ProjectRequest>> {
        let placeholders: Vec<String> = (0..statuses.len())
            .map(|i| format!("?{}", i + 4))
            .collect();

        let sql = format!(
            "SELECT * FROM project_request
             WHERE user_id = ?1 AND project_id = ?2 AND role_id = ?3
               AND status IN ({})",
            placeholders.join(", ")
        );

        let mut query = sqlx::query_as::<_, ProjectRequest>(&sql)
            .bind(user_id)
            .bind(action.project_id)
            .bind(action.role_id);
        for status in statuses {
            query = query.bind(status.as_str());
        }

        query.fetch_optional(&self.db).await.map_err(ApiError::Database)
    }
}
