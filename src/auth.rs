/// Authentication extractor
///
/// The authorization gate: each protected handler takes a `Principal`,
/// which verifies the access token once per request and carries the
/// authenticated user id as a typed value. No database lookup happens here;
/// the signed claim is trusted until it expires.
use crate::{
    api::middleware::extract_access_token,
    context::AppContext,
    error::ApiError,
    token,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Authenticated request principal
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: i64,
}

#[async_trait]
impl FromRequestParts<AppContext> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_access_token(&parts.headers)
            .ok_or_else(|| ApiError::Authentication("Missing access token".to_string()))?;

        let user_id = token::subject(&token, &state.config.authentication.access_token_secret)?;

        Ok(Principal { user_id })
    }
}
