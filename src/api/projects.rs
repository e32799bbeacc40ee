/// Project, role and join-request endpoints
///
/// Reads are public; every mutation takes a `Principal` and the managers
/// enforce ownership against the ids it carries.
use crate::{
    auth::Principal,
    context::AppContext,
    db::models::{NamedRef, ProjectRequest, ProjectRole, Stage},
    error::ApiResult,
    projects::{
        CreateProjectRequest, CreateRoleRequest, ProjectFilters, ProjectView, ReplyRequest,
        RequestAction, UpdateRoleRequest,
    },
};
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

/// Build project routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/:id/requests", get(list_project_requests))
        .route("/project/request/apply", post(apply))
        .route("/project/request/cancel", delete(cancel))
        .route("/project/request/withdraw", delete(withdraw))
        .route("/project/request/reply", put(reply))
        .route("/project/roles", post(create_role))
        .route("/project/roles/:id", put(update_role).delete(delete_role))
        .route("/meta/categories", get(categories))
        .route("/meta/technologies", get(technologies))
        .route("/meta/languages", get(languages))
        .route("/meta/types", get(types))
}

/// Listing filters
#[derive(Debug, Deserialize)]
struct ProjectListQuery {
    stage: Option<String>,
    category_id: Option<i64>,
    type_id: Option<i64>,
}

/// List projects, optionally filtered
async fn list_projects(
    State(ctx): State<AppContext>,
    Query(q): Query<ProjectListQuery>,
) -> ApiResult<Json<Vec<ProjectView>>> {
    let filters = ProjectFilters {
        stage: q.stage.as_deref().map(Stage::parse).transpose()?,
        category_id: q.category_id,
        type_id: q.type_id,
    };

    Ok(Json(ctx.projects.list(&filters).await?))
}

/// Get a project by id
async fn get_project(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProjectView>> {
    Ok(Json(ctx.projects.get_by_id(id).await?))
}

/// Create a project owned by the caller
async fn create_project(
    State(ctx): State<AppContext>,
    principal: Principal,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<ProjectView>> {
    req.validate()?;
    Ok(Json(ctx.projects.create(principal.user_id, &req).await?))
}

/// Update a project; owner only
async fn update_project(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<ProjectView>> {
    req.validate()?;
    Ok(Json(ctx.projects.update(principal.user_id, id, &req).await?))
}

/// Delete a project; owner only
async fn delete_project(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.projects.delete(principal.user_id, id).await?;
    Ok(Json(serde_json::json!({ "message": "Project deleted" })))
}

/// List a project's join requests; owner only
async fn list_project_requests(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<ProjectRequest>>> {
    Ok(Json(
        ctx.requests.list_for_project(principal.user_id, id).await?,
    ))
}

/// Apply to a role on a project
async fn apply(
    State(ctx): State<AppContext>,
    principal: Principal,
    Json(req): Json<RequestAction>,
) -> ApiResult<Json<ProjectRequest>> {
    req.validate()?;
    Ok(Json(ctx.requests.apply(principal.user_id, &req).await?))
}

/// Cancel the caller's pending request
async fn cancel(
    State(ctx): State<AppContext>,
    principal: Principal,
    Json(req): Json<RequestAction>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate()?;
    ctx.requests.cancel(principal.user_id, &req).await?;
    Ok(Json(serde_json::json!({ "message": "Request cancelled" })))
}

/// Withdraw the caller's pending or accepted request
async fn withdraw(
    State(ctx): State<AppContext>,
    principal: Principal,
    Json(req): Json<RequestAction>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate()?;
    ctx.requests.withdraw(principal.user_id, &req).await?;
    Ok(Json(serde_json::json!({ "message": "Withdrawn from project" })))
}

/// Accept or reject a request; owner only
async fn reply(
    State(ctx): State<AppContext>,
    principal: Principal,
    Json(req): Json<ReplyRequest>,
) -> ApiResult<Json<ProjectRequest>> {
    req.validate()?;
    Ok(Json(ctx.requests.reply(principal.user_id, &req).await?))
}

/// Create a role; owner only
async fn create_role(
    State(ctx): State<AppContext>,
    principal: Principal,
    Json(req): Json<CreateRoleRequest>,
) -> ApiResult<Json<ProjectRole>> {
    req.validate()?;
    Ok(Json(ctx.roles.create(principal.user_id, &req).await?))
}

/// Update a role; owner only
async fn update_role(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<ProjectRole>> {
    req.validate()?;
    Ok(Json(ctx.roles.update(principal.user_id, id, &req).await?))
}

/// Delete a role; owner only
async fn delete_role(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.roles.delete(principal.user_id, id).await?;
    Ok(Json(serde_json::json!({ "message": "Role deleted" })))
}

async fn categories(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<NamedRef>>> {
    Ok(Json(ctx.projects.categories().await?))
}

async fn technologies(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<NamedRef>>> {
    Ok(Json(ctx.projects.technologies().await?))
}

async fn languages(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<NamedRef>>> {
    Ok(Json(ctx.projects.languages().await?))
}

async fn types(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<NamedRef>>> {
    Ok(Json(ctx.projects.types().await?))
}
