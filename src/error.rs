/// Unified error types for the crewmatch API
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Authentication errors (missing or bad credentials)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Password login attempted against a federated-only account
    #[error("Account uses federated login")]
    FederatedLoginRequired,

    /// Federated login attempted against a password-only account
    #[error("Account uses password login")]
    PasswordLoginRequired,

    /// Wrong password for an existing account
    #[error("Invalid password")]
    InvalidPassword,

    /// Token signature invalid, malformed or expired
    #[error("Invalid token")]
    InvalidToken,

    /// Token algorithm header does not match the pinned algorithm
    #[error("Unexpected token signing method")]
    UnexpectedSigningMethod,

    /// Token signing failures
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Authorization errors (authenticated but not the owner)
    #[error("Not authorized: {0}")]
    Forbidden(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors (duplicate email, duplicate active request)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// OAuth authorization-code exchange failed
    #[error("Code exchange failed: {0}")]
    CodeExchange(String),

    /// Identity provider could not be reached
    #[error("Identity provider unreachable: {0}")]
    ProviderUnavailable(String),

    /// Identity provider response could not be read
    #[error("Failed to read provider response: {0}")]
    ProviderResponse(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert ApiError to an HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Authentication(_)
            | ApiError::FederatedLoginRequired
            | ApiError::PasswordLoginRequired
            | ApiError::InvalidPassword
            | ApiError::InvalidToken
            | ApiError::UnexpectedSigningMethod => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                self.to_string(),
            ),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden", self.to_string()),
            ApiError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", self.to_string()),
            ApiError::Database(_)
            | ApiError::Internal(_)
            | ApiError::Io(_)
            | ApiError::Signing(_)
            | ApiError::CodeExchange(_)
            | ApiError::ProviderUnavailable(_)
            | ApiError::ProviderResponse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        tracing::error!(%status, error = error_code, "request failed: {}", self);

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
