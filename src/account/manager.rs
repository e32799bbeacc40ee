/// Account manager
///
/// Owns the identity-reconciliation and session flows: signup, password
/// login, federated login, token refresh, and user record CRUD. Tokens are
/// stateless signed claims; nothing session-shaped is persisted.

use crate::{
    account::{SignupRequest, TokenPair, UpdateUserRequest},
    config::ServerConfig,
    db::models::User,
    error::{ApiError, ApiResult},
    oauth::GoogleProfile,
    token,
};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use password_hash::{PasswordHash, SaltString};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Register a new password account and issue its first token pair
    pub async fn signup(&self, req: &SignupRequest) -> ApiResult<(User, TokenPair)> {
        if self.email_exists(&req.email).await? {
            return Err(ApiError::Conflict("User already exists".to_string()));
        }

        if self.username_exists(&req.username).await? {
            return Err(ApiError::Conflict(format!(
                "Username {} already taken",
                req.username
            )));
        }

        let password_hash = hash_password(&req.password)?;

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO user (name, username, email, password_hash, availability, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&req.name)
        .bind(&req.username)
        .bind(&req.email)
        .bind(&password_hash)
        .bind(true)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        let user = self.get_user(result.last_insert_rowid()).await?;
        let tokens = self.issue_token_pair(user.id)?;

        tracing::info!(user_id = user.id, "account created");
        Ok((user, tokens))
    }

    /// Authenticate with email + password and issue a token pair
    ///
    /// Federated accounts never reach the password comparison.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<(User, TokenPair)> {
        let user = self.get_user_by_email(email).await?;

        if user.google_id.is_some() {
            return Err(ApiError::FederatedLoginRequired);
        }

        if !verify_password(password, &user.password_hash) {
            return Err(ApiError::InvalidPassword);
        }

        let tokens = self.issue_token_pair(user.id)?;
        Ok((user, tokens))
    }

    /// Reconcile a federated (Google) identity to a user record
    ///
    /// First federated login creates the account. An existing record is
    /// reused only when its stored federated id matches the provider's
    /// subject; a password-only account with the same email is never
    /// silently linked.
    pub async fn login_with_google(&self, profile: &GoogleProfile) -> ApiResult<(User, TokenPair)> {
        let user = match self.find_user_by_email(&profile.email).await? {
            Some(existing) => match existing.google_id.as_deref() {
                Some(gid) if gid == profile.id => existing,
                Some(_) => {
                    return Err(ApiError::Authentication(
                        "Federated identity does not match this account".to_string(),
                    ))
                }
                None => return Err(ApiError::PasswordLoginRequired),
            },
            None => self.create_federated_user(profile).await?,
        };

        let tokens = self.issue_token_pair(user.id)?;
        Ok((user, tokens))
    }

    /// Mint a new token pair from a valid refresh token
    ///
    /// The old refresh token is not revoked server-side; it stays valid
    /// until its own expiry.
    pub async fn refresh(&self, refresh_token: &str) -> ApiResult<(User, TokenPair)> {
        let user_id = token::subject(
            refresh_token,
            &self.config.authentication.refresh_token_secret,
        )?;

        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| ApiError::Authentication("Account no longer exists".to_string()))?;

        let tokens = self.issue_token_pair(user.id)?;
        Ok((user, tokens))
    }

    /// Issue an access + refresh pair for a user id
    pub fn issue_token_pair(&self, user_id: i64) -> ApiResult<TokenPair> {
        let auth = &self.config.authentication;

        Ok(TokenPair {
            access_token: token::issue(
                user_id,
                &auth.access_token_secret,
                auth.access_token_expiry_hours,
            )?,
            refresh_token: token::issue(
                user_id,
                &auth.refresh_token_secret,
                auth.refresh_token_expiry_hours,
            )?,
        })
    }

    /// Get user by id
    pub async fn get_user(&self, id: i64) -> ApiResult<User> {
        self.find_user(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Find user by id, None when absent
    pub async fn find_user(&self, id: i64) -> ApiResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM user WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)
    }

    /// Get user by email
    pub async fn get_user_by_email(&self, email: &str) -> ApiResult<User> {
        self.find_user_by_email(email)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    async fn find_user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM user WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)
    }

    /// Get user by username
    pub async fn get_user_by_username(&self, username: &str) -> ApiResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM user WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// List all users
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM user ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)
    }

    /// Update profile fields of a user
    pub async fn update_user(&self, id: i64, req: &UpdateUserRequest) -> ApiResult<User> {
        let result = sqlx::query(
            "UPDATE user SET name = ?1, profile_picture = ?2, availability = ?3, updated_at = ?4
             WHERE id = ?5",
        )
        .bind(&req.name)
        .bind(&req.profile_picture)
        .bind(req.availability)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        self.get_user(id).await
    }

    /// Delete a user account
    pub async fn delete_user(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM user WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        tracing::info!(user_id = id, "account deleted");
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> ApiResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(count > 0)
    }

    async fn username_exists(&self, username: &str) -> ApiResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE username = ?1")
            .bind(username)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(count > 0)
    }

    /// Create a user record from a federated profile
    ///
    /// The password hash stays empty; the account can only authenticate
    /// through the provider.
    async fn create_federated_user(&self, profile: &GoogleProfile) -> ApiResult<User> {
        let username = self.generate_username(&profile.name).await?;

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO user (google_id, name, username, email, password_hash, profile_picture, availability, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, '', ?5, ?6, ?7, ?8)",
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&username)
        .bind(&profile.email)
        .bind(&profile.picture)
        .bind(true)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        tracing::info!(username = %username, "federated account created");
        self.get_user(result.last_insert_rowid()).await
    }

    /// Derive a unique username from a display name
    async fn generate_username(&self, name: &str) -> ApiResult<String> {
        let base: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        let base = if base.is_empty() { "user".to_string() } else { base };

        for _ in 0..5 {
            let candidate = format!("{}_{}", base, random_suffix(6));
            if !self.username_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(ApiError::Internal(
            "Could not allocate a unique username".to_string(),
        ))
    }
}

/// Hash a password with Argon2id and a fresh random salt
fn hash_password(password: &str) -> ApiResult<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| ApiError::Internal(format!("Salt generation failed: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| ApiError::Internal(format!("Salt encoding failed: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored PHC hash
fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn random_suffix(len: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_distinct_hashes_per_signup() {
        let first = hash_password("same password").unwrap();
        let second = hash_password("same password").unwrap();
        // Fresh salt each time
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_hash_never_verifies() {
        // Federated-only accounts store an empty hash
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_random_suffix_charset() {
        let suffix = random_suffix(6);
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
