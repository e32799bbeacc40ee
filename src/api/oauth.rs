/// Federated (Google) login endpoints
///
/// Two phases: the redirect phase stores an anti-forgery state nonce in a
/// short-lived cookie and sends the browser to the provider; the callback
/// phase checks the nonce, exchanges the code, fetches the profile and
/// reconciles it to a user record.
use crate::{
    account::LoginResponse,
    api::session::{expired_cookie, session_jar},
    context::AppContext,
    error::{ApiError, ApiResult},
    oauth::{self, GoogleClient},
};
use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;

const STATE_COOKIE: &str = "oauthstate";

/// Build federated login routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/google/login", get(google_login))
        .route("/google/callback", get(google_callback))
}

fn google_client(ctx: &AppContext) -> ApiResult<&Arc<GoogleClient>> {
    ctx.google
        .as_ref()
        .ok_or_else(|| ApiError::Validation("Google login is not configured".to_string()))
}

/// Redirect phase
async fn google_login(
    State(ctx): State<AppContext>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Redirect)> {
    let client = google_client(&ctx)?;

    let state = oauth::generate_state();
    let url = client.authorization_url(&state);

    let cookie = Cookie::build((STATE_COOKIE, state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(10))
        .build();

    Ok((jar.add(cookie), Redirect::temporary(&url)))
}

/// Callback query parameters
#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Callback phase
async fn google_callback(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let client = google_client(&ctx)?;

    if let Some(error) = params.error {
        return Err(ApiError::Authentication(format!(
            "Provider returned error: {}",
            error
        )));
    }

    let state = params
        .state
        .ok_or_else(|| ApiError::Authentication("Missing state parameter".to_string()))?;
    let expected = jar
        .get(STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::Authentication("Missing state cookie".to_string()))?;

    if state != expected {
        return Err(ApiError::Authentication("State mismatch".to_string()));
    }

    let code = params
        .code
        .ok_or_else(|| ApiError::Authentication("Missing authorization code".to_string()))?;

    let provider_token = client.exchange_code(&code).await?;
    let profile = client.fetch_profile(&provider_token).await?;

    let (user, tokens) = ctx.accounts.login_with_google(&profile).await?;

    let jar = session_jar(jar.add(expired_cookie(STATE_COOKIE)), &tokens);

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
