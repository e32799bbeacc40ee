/// Session flow tests: signup, password and federated login, refresh.
mod common;

use common::{create_user, setup, signup_request};
use crewmatch::{error::ApiError, oauth::GoogleProfile, token};

fn google_profile(id: &str, email: &str, name: &str) -> GoogleProfile {
    GoogleProfile {
        id: id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        picture: Some("https://example.com/avatar.png".to_string()),
    }
}

#[tokio::test]
async fn test_signup_then_login() {
    let env = setup().await;

    let (user, signup_tokens) = env
        .accounts
        .signup(&signup_request("Ada", "ada@example.com", "ada_l"))
        .await
        .unwrap();

    let (logged_in, login_tokens) = env
        .accounts
        .login("ada@example.com", "correct horse battery staple")
        .await
        .unwrap();

    assert_eq!(logged_in.id, user.id);
    // Every issuance produces a fresh pair
    assert_ne!(signup_tokens.access_token, login_tokens.access_token);
    assert_ne!(signup_tokens.refresh_token, login_tokens.refresh_token);

    // Both access tokens embed the same subject
    let secret = &env.config.authentication.access_token_secret;
    assert_eq!(token::subject(&login_tokens.access_token, secret).unwrap(), user.id);
}

#[tokio::test]
async fn test_duplicate_signup_rejected() {
    let env = setup().await;

    create_user(&env, "Ada", "ada@example.com", "ada_l").await;

    let err = env
        .accounts
        .signup(&signup_request("Other Ada", "ada@example.com", "other_ada"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn test_login_unknown_email() {
    let env = setup().await;

    let err = env
        .accounts
        .login("nobody@example.com", "whatever password")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let env = setup().await;

    create_user(&env, "Ada", "ada@example.com", "ada_l").await;

    let err = env
        .accounts
        .login("ada@example.com", "wrong password")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidPassword));
}

#[tokio::test]
async fn test_password_login_rejected_for_federated_account() {
    let env = setup().await;

    let (user, _tokens) = env
        .accounts
        .login_with_google(&google_profile("g-1", "fed@example.com", "Fed User"))
        .await
        .unwrap();
    assert!(user.google_id.is_some());
    assert!(user.password_hash.is_empty());

    // Never falls through to the password comparison
    let err = env
        .accounts
        .login("fed@example.com", "anything at all")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::FederatedLoginRequired));
}

#[tokio::test]
async fn test_google_login_creates_account_on_first_login() {
    let env = setup().await;

    let (user, _tokens) = env
        .accounts
        .login_with_google(&google_profile("g-1", "fed@example.com", "Fed User"))
        .await
        .unwrap();

    assert_eq!(user.email, "fed@example.com");
    assert_eq!(user.google_id.as_deref(), Some("g-1"));
    assert!(user.username.starts_with("feduser_"));
    assert_eq!(
        user.profile_picture.as_deref(),
        Some("https://example.com/avatar.png")
    );
}

#[tokio::test]
async fn test_google_login_reuses_matching_account() {
    let env = setup().await;

    let profile = google_profile("g-1", "fed@example.com", "Fed User");
    let (first, _) = env.accounts.login_with_google(&profile).await.unwrap();
    let (second, _) = env.accounts.login_with_google(&profile).await.unwrap();

    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_google_login_rejected_for_password_account() {
    let env = setup().await;

    create_user(&env, "Ada", "ada@example.com", "ada_l").await;

    // Same email, but the account was created with a password; a federated
    // login must not silently take it over
    let err = env
        .accounts
        .login_with_google(&google_profile("g-9", "ada@example.com", "Ada"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::PasswordLoginRequired));
}

#[tokio::test]
async fn test_google_login_rejected_on_identity_mismatch() {
    let env = setup().await;

    env.accounts
        .login_with_google(&google_profile("g-1", "fed@example.com", "Fed User"))
        .await
        .unwrap();

    let err = env
        .accounts
        .login_with_google(&google_profile("g-2", "fed@example.com", "Fed User"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Authentication(_)));
}

#[tokio::test]
async fn test_refresh_yields_new_pair_with_same_subject() {
    let env = setup().await;

    let (user, tokens) = env
        .accounts
        .signup(&signup_request("Ada", "ada@example.com", "ada_l"))
        .await
        .unwrap();

    let (refreshed_user, new_tokens) = env.accounts.refresh(&tokens.refresh_token).await.unwrap();

    assert_eq!(refreshed_user.id, user.id);
    assert_ne!(new_tokens.access_token, tokens.access_token);
    assert_ne!(new_tokens.refresh_token, tokens.refresh_token);

    let secret = &env.config.authentication.access_token_secret;
    assert_eq!(
        token::subject(&new_tokens.access_token, secret).unwrap(),
        user.id
    );
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let env = setup().await;

    let (_user, tokens) = env
        .accounts
        .signup(&signup_request("Ada", "ada@example.com", "ada_l"))
        .await
        .unwrap();

    // Distinct secrets per token class: an access token must never be
    // accepted where a refresh token is expected
    let err = env.accounts.refresh(&tokens.access_token).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
}

#[tokio::test]
async fn test_refresh_rejects_garbage_token() {
    let env = setup().await;

    let err = env.accounts.refresh("not-a-jwt").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidToken));
}

#[tokio::test]
async fn test_refresh_rejected_after_account_deletion() {
    let env = setup().await;

    let (user, tokens) = env
        .accounts
        .signup(&signup_request("Ada", "ada@example.com", "ada_l"))
        .await
        .unwrap();

    env.accounts.delete_user(user.id).await.unwrap();

    let err = env.accounts.refresh(&tokens.refresh_token).await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication(_)));
}

#[tokio::test]
async fn test_federated_usernames_do_not_collide() {
    let env = setup().await;

    let (first, _) = env
        .accounts
        .login_with_google(&google_profile("g-1", "one@example.com", "Same Name"))
        .await
        .unwrap();
    let (second, _) = env
        .accounts
        .login_with_google(&google_profile("g-2", "two@example.com", "Same Name"))
        .await
        .unwrap();

    assert_ne!(first.username, second.username);
}
