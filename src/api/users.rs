/// User endpoints
///
/// All routes require authentication. Email and federated id are only
/// disclosed on the caller's own profile.
use crate::{
    account::{UpdateUserRequest, UserProfile},
    api::session::{expired_cookie, ACCESS_COOKIE, REFRESH_COOKIE},
    auth::Principal,
    context::AppContext,
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

/// Build user routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/user", get(get_self).put(update_self).delete(delete_self))
        .route("/user/all", get(list_users))
        .route("/user/:username", get(get_by_username))
}

/// Current user's own profile
async fn get_self(
    State(ctx): State<AppContext>,
    principal: Principal,
) -> ApiResult<Json<UserProfile>> {
    let user = ctx.accounts.get_user(principal.user_id).await?;
    Ok(Json(UserProfile::owner(&user)))
}

/// List all users (public fields only)
async fn list_users(
    State(ctx): State<AppContext>,
    _principal: Principal,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let users = ctx.accounts.list_users().await?;
    Ok(Json(users.iter().map(UserProfile::public).collect()))
}

/// Look up a user by username
async fn get_by_username(
    State(ctx): State<AppContext>,
    principal: Principal,
    Path(username): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let user = ctx.accounts.get_user_by_username(&username).await?;

    let profile = if user.id == principal.user_id {
        UserProfile::owner(&user)
    } else {
        UserProfile::public(&user)
    };

    Ok(Json(profile))
}

/// Update the current user's profile
async fn update_self(
    State(ctx): State<AppContext>,
    principal: Principal,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    req.validate()?;

    let user = ctx.accounts.update_user(principal.user_id, &req).await?;
    Ok(Json(UserProfile::owner(&user)))
}

/// Delete the current user's account and discard the session cookies
async fn delete_self(
    State(ctx): State<AppContext>,
    principal: Principal,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<serde_json::Value>)> {
    ctx.accounts.delete_user(principal.user_id).await?;

    let jar = jar
        .add(expired_cookie(ACCESS_COOKIE))
        .add(expired_cookie(REFRESH_COOKIE));

    Ok((jar, Json(serde_json::json!({ "message": "Account deleted" }))))
}
