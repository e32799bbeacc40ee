/// Stateless JWT issuance and verification
///
/// Access and refresh tokens carry the same claim shape but are signed with
/// distinct secrets, so one class is never accepted where the other is
/// expected. The signing algorithm is pinned to HS256; tokens whose header
/// names any other algorithm are rejected outright.
use crate::error::{ApiError, ApiResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Signed claims carried by both token classes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Random token id, so every issued pair is distinct
    pub jti: String,
}

/// Sign a token for a user id, valid for `ttl_hours`
pub fn issue(user_id: i64, secret: &str, ttl_hours: i64) -> ApiResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
        jti: generate_jti(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Signing(e.to_string()))
}

/// Verify a token's signature and expiry, returning its claims
pub fn verify(token: &str, secret: &str) -> ApiResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Allow some clock skew (1 minute)
    validation.leeway = 60;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("token verification failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => ApiError::UnexpectedSigningMethod,
            _ => ApiError::InvalidToken,
        }
    })
}

/// Verify a token and extract the user id it was issued for
pub fn subject(token: &str, secret: &str) -> ApiResult<i64> {
    let claims = verify(token, secret)?;
    claims.sub.parse().map_err(|_| ApiError::InvalidToken)
}

fn generate_jti() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..16)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const OTHER_SECRET: &str = "fedcba9876543210fedcba9876543210";

    #[test]
    fn test_round_trip_recovers_subject() {
        let token = issue(42, SECRET, 1).unwrap();
        assert_eq!(subject(&token, SECRET).unwrap(), 42);
    }

    #[test]
    fn test_repeated_issuance_yields_distinct_tokens() {
        let first = issue(42, SECRET, 1).unwrap();
        let second = issue(42, SECRET, 1).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_wrong_secret_fails_verification() {
        let token = issue(42, SECRET, 1).unwrap();
        assert!(matches!(
            subject(&token, OTHER_SECRET),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Issued two hours in the past, well beyond the leeway
        let token = issue(42, SECRET, -2).unwrap();
        assert!(matches!(verify(&token, SECRET), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn test_algorithm_confusion_rejected() {
        let claims = Claims {
            sub: "42".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            jti: "testjti".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify(&token, SECRET),
            Err(ApiError::UnexpectedSigningMethod)
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(matches!(
            verify("not.a.token", SECRET),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let claims = Claims {
            sub: "not-an-id".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            jti: "testjti".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(subject(&token, SECRET), Err(ApiError::InvalidToken)));
    }
}
