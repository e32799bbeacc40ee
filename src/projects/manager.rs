/// Project manager
///
/// CRUD over projects and their tag associations. Creation and update wrap
/// the project row and its tag rows in one transaction; update and delete
/// are gated on ownership.
use crate::{
    db::models::{NamedRef, ProjectRole, Stage},
    error::{ApiError, ApiResult},
    projects::{ensure_owner, CreateProjectRequest, ProjectCreator, ProjectView},
};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// Optional filters for project listing
#[derive(Debug, Clone, Default)]
pub struct ProjectFilters {
    pub stage: Option<Stage>,
    pub category_id: Option<i64>,
    pub type_id: Option<i64>,
}

/// Project manager service
pub struct ProjectManager {
    db: SqlitePool,
}

impl ProjectManager {
    /// Create a new project manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a project owned by `creator_id`, with its tag associations
    pub async fn create(
        &self,
        creator_id: i64,
        req: &CreateProjectRequest,
    ) -> ApiResult<ProjectView> {
        // Surface a clean not-found instead of a foreign key failure
        self.category(req.category_id).await?;

        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO project (title, description, goals, category_id, stage, creator_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.goals)
        .bind(req.category_id)
        .bind(req.stage.as_str())
        .bind(creator_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::Database)?;

        let project_id = result.last_insert_rowid();
        insert_tags(&mut tx, project_id, req).await?;

        tx.commit().await.map_err(ApiError::Database)?;

        tracing::info!(project_id, creator_id, "project created");
        self.get_by_id(project_id).await
    }

    /// Get a project by id with creator, category, tags and roles
    pub async fn get_by_id(&self, id: i64) -> ApiResult<ProjectView> {
        let row = sqlx::query(
            "SELECT p.id, p.title, p.description, p.goals, p.stage, p.created_at, p.updated_at,
                    c.id AS category_id, c.name AS category_name,
                    u.id AS creator_id, u.name AS creator_name, u.username AS creator_username,
                    u.profile_picture AS creator_profile_picture, u.availability AS creator_availability
             FROM project p
             JOIN user u ON u.id = p.creator_id
             JOIN category c ON c.id = p.category_id
             WHERE p.id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

        let stage = Stage::parse(&row.get::<String, _>("stage"))?;
        let created_at: DateTime<Utc> = row.get("created_at");
        let updated_at: DateTime<Utc> = row.get("updated_at");

        let types = self
            .tag_set(id, "project_type", "project_type_kind", "type_id")
            .await?;
        let technologies = self
            .tag_set(id, "project_technology", "technology", "technology_id")
            .await?;
        let languages = self
            .tag_set(id, "project_language", "language", "language_id")
            .await?;

        let roles = sqlx::query_as::<_, ProjectRole>(
            "SELECT * FROM project_role WHERE project_id = ?1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(ProjectView {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            goals: row.get("goals"),
            stage,
            created_at,
            updated_at,
            creator: ProjectCreator {
                id: row.get("creator_id"),
                name: row.get("creator_name"),
                username: row.get("creator_username"),
                profile_picture: row.get("creator_profile_picture"),
                availability: row.get("creator_availability"),
            },
            category: NamedRef {
                id: row.get("category_id"),
                name: row.get("category_name"),
            },
            types,
            technologies,
            languages,
            roles,
        })
    }

    /// List projects matching the given filters
    pub async fn list(&self, filters: &ProjectFilters) -> ApiResult<Vec<ProjectView>> {
        let mut sql = String::from("SELECT DISTINCT p.id, p.created_at FROM project p");
        if filters.type_id.is_some() {
            sql.push_str(" JOIN project_type pt ON pt.project_id = p.id");
        }

        let mut clauses = Vec::new();
        if filters.stage.is_some() {
            clauses.push("p.stage = ?");
        }
        if filters.category_id.is_some() {
            clauses.push("p.category_id = ?");
        }
        if filters.type_id.is_some() {
            clauses.push("pt.type_id = ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY p.created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(stage) = filters.stage {
            query = query.bind(stage.as_str());
        }
        if let Some(category_id) = filters.category_id {
            query = query.bind(category_id);
        }
        if let Some(type_id) = filters.type_id {
            query = query.bind(type_id);
        }

        let rows = query.fetch_all(&self.db).await.map_err(ApiError::Database)?;

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            projects.push(self.get_by_id(row.get("id")).await?);
        }

        Ok(projects)
    }

    /// Update a project; owner only
    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        req: &CreateProjectRequest,
    ) -> ApiResult<ProjectView> {
        ensure_owner(&self.db, id, user_id).await?;
        self.category(req.category_id).await?;

        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        sqlx::query(
            "UPDATE project SET title = ?1, description = ?2, goals = ?3, category_id = ?4,
                    stage = ?5, updated_at = ?6
             WHERE id = ?7",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.goals)
        .bind(req.category_id)
        .bind(req.stage.as_str())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::Database)?;

        // Replace the tag sets wholesale
        for table in ["project_type", "project_technology", "project_language"] {
            sqlx::query(&format!("DELETE FROM {} WHERE project_id = ?1", table))
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(ApiError::Database)?;
        }
        insert_tags(&mut tx, id, req).await?;

        tx.commit().await.map_err(ApiError::Database)?;

        self.get_by_id(id).await
    }

    /// Delete a project; owner only. Roles and requests cascade.
    pub async fn delete(&self, user_id: i64, id: i64) -> ApiResult<()> {
        ensure_owner(&self.db, id, user_id).await?;

        sqlx::query("DELETE FROM project WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        tracing::info!(project_id = id, "project deleted");
        Ok(())
    }

    /// List all categories
    pub async fn categories(&self) -> ApiResult<Vec<NamedRef>> {
        self.named_refs("category").await
    }

    /// List all technologies
    pub async fn technologies(&self) -> ApiResult<Vec<NamedRef>> {
        self.named_refs("technology").await
    }

    /// List all languages
    pub async fn languages(&self) -> ApiResult<Vec<NamedRef>> {
        self.named_refs("language").await
    }

    /// List all project types
    pub async fn types(&self) -> ApiResult<Vec<NamedRef>> {
        self.named_refs("project_type_kind").await
    }

    async fn category(&self, id: i64) -> ApiResult<NamedRef> {
        sqlx::query_as::<_, NamedRef>("SELECT id, name FROM category WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
    }

    async fn named_refs(&self, table: &str) -> ApiResult<Vec<NamedRef>> {
        sqlx::query_as::<_, NamedRef>(&format!("SELECT id, name FROM {} ORDER BY name", table))
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)
    }

    async fn tag_set(
        &self,
        project_id: i64,
        join_table: &str,
        ref_table: &str,
        fk: &str,
    ) -> ApiResult<Vec<NamedRef>> {
        sqlx::query_as::<_, NamedRef>(&format!(
            "SELECT r.id, r.name FROM {ref_table} r
             JOIN {join_table} j ON j.{fk} = r.id
             WHERE j.project_id = ?1 ORDER BY r.name",
        ))
        .bind(project_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)
    }
}

/// Insert tag association rows for a project inside an open transaction
async fn insert_tags(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    project_id: i64,
    req: &CreateProjectRequest,
) -> ApiResult<()> {
    for type_id in &req.project_types {
        sqlx::query("INSERT INTO project_type (project_id, type_id) VALUES (?1, ?2)")
            .bind(project_id)
            .bind(type_id)
            .execute(&mut **tx)
            .await
            .map_err(ApiError::Database)?;
    }

    for technology_id in &req.technologies {
        sqlx::query("INSERT INTO project_technology (project_id, technology_id) VALUES (?1, ?2)")
            .bind(project_id)
            .bind(technology_id)
            .execute(&mut **tx)
            .await
            .map_err(ApiError::Database)?;
    }

    for language_id in &req.languages {
        sqlx::query("INSERT INTO project_language (project_id, language_id) VALUES (?1, ?2)")
            .bind(project_id)
            .bind(language_id)
            .execute(&mut **tx)
            .await
            .map_err(ApiError::Database)?;
    }

    Ok(())
}
