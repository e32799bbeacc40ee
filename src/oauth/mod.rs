/// Google OAuth client
///
/// Handles the two-phase federated login: building the authorization
/// redirect with an anti-forgery state nonce, then exchanging the callback
/// code for a provider access token and fetching the user's profile.
use crate::{
    config::GoogleOAuthConfig,
    error::{ApiError, ApiResult},
};
use base64::Engine;
use serde::{Deserialize, Serialize};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Profile fields returned by the provider's userinfo endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Token response from the code exchange
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google OAuth client
pub struct GoogleClient {
    config: GoogleOAuthConfig,
    http: reqwest::Client,
}

impl GoogleClient {
    /// Create a new client from configuration
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Build the provider authorization URL carrying the state nonce
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            AUTH_URL,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode("https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/userinfo.profile"),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for a provider access token
    pub async fn exchange_code(&self, code: &str) -> ApiResult<String> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| ApiError::CodeExchange(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::CodeExchange(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::CodeExchange(e.to_string()))?;

        Ok(token.access_token)
    }

    /// Fetch the user's profile with a provider access token
    pub async fn fetch_profile(&self, access_token: &str) -> ApiResult<GoogleProfile> {
        let response = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ApiError::ProviderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::ProviderUnavailable(format!(
                "userinfo endpoint returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::ProviderResponse(e.to_string()))
    }
}

/// Generate a random anti-forgery state nonce
pub fn generate_state() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_url: "http://localhost:8080/api/google/callback".to_string(),
        }
    }

    #[test]
    fn test_authorization_url_carries_state() {
        let client = GoogleClient::new(test_config());
        let url = client.authorization_url("nonce-123");

        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("state=nonce-123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains(&urlencoding::encode("http://localhost:8080/api/google/callback").into_owned()));
    }

    #[test]
    fn test_state_nonces_are_unique_and_url_safe() {
        let first = generate_state();
        let second = generate_state();

        assert_ne!(first, second);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_profile_deserializes_without_optional_fields() {
        let profile: GoogleProfile =
            serde_json::from_str(r#"{"id":"g-1","email":"a@example.com"}"#).unwrap();
        assert_eq!(profile.id, "g-1");
        assert!(profile.picture.is_none());
        assert!(profile.name.is_empty());
    }
}
