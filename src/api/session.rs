/// Session endpoints: signup, login, refresh, logout
///
/// Tokens travel as HttpOnly SameSite=Lax cookies; the response body also
/// carries the pair for non-browser clients. Logout is stateless and only
/// instructs the client to discard both cookies.
use crate::{
    account::{LoginRequest, LoginResponse, RefreshRequest, SignupRequest, TokenPair},
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

pub(crate) const ACCESS_COOKIE: &str = "access_token";
pub(crate) const REFRESH_COOKIE: &str = "refresh_token";

/// Build session routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh_token", post(refresh_token))
        .route("/logout", post(logout))
}

/// Cookie carrying a session token: HttpOnly, SameSite=Lax, 30 days
fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(30))
        .build()
}

/// Removal cookie for logout and account deletion
pub(crate) fn expired_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}

/// Attach both session cookies to the jar
pub(crate) fn session_jar(jar: CookieJar, tokens: &TokenPair) -> CookieJar {
    jar.add(session_cookie(ACCESS_COOKIE, tokens.access_token.clone()))
        .add(session_cookie(REFRESH_COOKIE, tokens.refresh_token.clone()))
}

/// Signup endpoint
async fn signup(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(CookieJar, Json<TokenPair>)> {
    req.validate()?;

    let (_user, tokens) = ctx.accounts.signup(&req).await?;
    let jar = session_jar(jar, &tokens);

    Ok((jar, Json(tokens)))
}

/// Login endpoint
async fn login(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    req.validate()?;

    let (user, tokens) = ctx.accounts.login(&req.email, &req.password).await?;
    let jar = session_jar(jar, &tokens);

    Ok((
        jar,
        Json(LoginResponse {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

/// Refresh endpoint
///
/// The refresh token is read from its cookie, falling back to the request
/// body for clients that do not hold cookies.
async fn refresh_token(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<(CookieJar, Json<TokenPair>)> {
    let refresh = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| body.map(|Json(b)| b.refresh_token))
        .ok_or_else(|| ApiError::Authentication("Missing refresh token".to_string()))?;

    let (_user, tokens) = ctx.accounts.refresh(&refresh).await?;
    let jar = session_jar(jar, &tokens);

    Ok((jar, Json(tokens)))
}

/// Logout endpoint
async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar
        .add(expired_cookie(ACCESS_COOKIE))
        .add(expired_cookie(REFRESH_COOKIE));

    (jar, Json(serde_json::json!({ "message": "Logged out" })))
}
