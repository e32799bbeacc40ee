/// Configuration management for the crewmatch server
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub oauth: Option<GoogleOAuthConfig>,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
}

/// Authentication configuration
///
/// Access and refresh tokens are signed with distinct secrets so a leaked
/// refresh secret cannot mint access tokens and vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub access_token_secret: String,
    pub access_token_expiry_hours: i64,
    pub refresh_token_secret: String,
    pub refresh_token_expiry_hours: i64,
}

/// Google OAuth configuration for federated login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("CREW_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("CREW_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;
        let request_timeout_secs = env::var("CREW_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let data_directory: PathBuf = env::var("CREW_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("CREW_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("crewmatch.sqlite"));

        let access_token_secret = env::var("CREW_ACCESS_TOKEN_SECRET")
            .map_err(|_| ApiError::Validation("Access token secret required".to_string()))?;
        let access_token_expiry_hours = env::var("CREW_ACCESS_TOKEN_EXPIRY_HOURS")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .unwrap_or(2);
        let refresh_token_secret = env::var("CREW_REFRESH_TOKEN_SECRET")
            .map_err(|_| ApiError::Validation("Refresh token secret required".to_string()))?;
        let refresh_token_expiry_hours = env::var("CREW_REFRESH_TOKEN_EXPIRY_HOURS")
            .unwrap_or_else(|_| "168".to_string())
            .parse()
            .unwrap_or(168);

        // Federated login is optional; routes stay disabled without it
        let oauth = if let Ok(client_id) = env::var("CREW_GOOGLE_CLIENT_ID") {
            Some(GoogleOAuthConfig {
                client_id,
                client_secret: env::var("CREW_GOOGLE_CLIENT_SECRET")
                    .map_err(|_| ApiError::Validation("Google client secret required".to_string()))?,
                redirect_url: env::var("CREW_GOOGLE_REDIRECT_URL").unwrap_or_else(|_| {
                    format!("http://{}:{}/api/google/callback", hostname, port)
                }),
            })
        } else {
            None
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                request_timeout_secs,
            },
            storage: StorageConfig {
                data_directory,
                database,
            },
            authentication: AuthConfig {
                access_token_secret,
                access_token_expiry_hours,
                refresh_token_secret,
                refresh_token_expiry_hours,
            },
            oauth,
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.access_token_secret.len() < 32 {
            return Err(ApiError::Validation(
                "Access token secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.refresh_token_secret.len() < 32 {
            return Err(ApiError::Validation(
                "Refresh token secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.access_token_secret == self.authentication.refresh_token_secret {
            return Err(ApiError::Validation(
                "Access and refresh token secrets must differ".to_string(),
            ));
        }

        Ok(())
    }
}
