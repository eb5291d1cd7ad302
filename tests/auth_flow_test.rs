//! Registration, login and token behaviour against the real stack.

mod common;

use chrono::{Duration, Utc};

use common::{registration, setup, TEST_SECRET};
use quick_deals::config::Config;
use quick_deals::errors::AppError;
use quick_deals::services::TokenService;

#[tokio::test]
async fn test_register_then_login_round_trip() {
    let app = setup().await;

    let user = app.register("alice", "a@x.com", "p1").await;
    assert_ne!(user.password_hash, "p1");
    assert!(user.password_hash.starts_with("$argon2"));

    let login = app
        .state
        .auth_service
        .login("a@x.com".into(), "p1".into())
        .await
        .unwrap();
    assert_eq!(login.user.email, "a@x.com");
    assert_eq!(login.user.user_name, "alice");

    let claims = app.state.auth_service.verify_token(&login.token).unwrap();
    assert_eq!(claims.subject, "a@x.com");
}

#[tokio::test]
async fn test_login_wrong_password_is_invalid_credentials() {
    let app = setup().await;
    app.register("alice", "a@x.com", "p1").await;

    let result = app
        .state
        .auth_service
        .login("a@x.com".into(), "p2".into())
        .await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_unknown_email_is_not_found() {
    let app = setup().await;

    let result = app
        .state
        .auth_service
        .login("ghost@x.com".into(), "p1".into())
        .await;
    assert!(matches!(result, Err(AppError::NotFound("User"))));
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = setup().await;
    app.register("alice", "a@x.com", "p1").await;

    let result = app
        .state
        .auth_service
        .register(registration("alice2", "a@x.com", "p1"))
        .await;
    assert!(matches!(result, Err(AppError::Conflict("Email"))));
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = setup().await;
    app.register("alice", "a@x.com", "p1").await;

    let result = app
        .state
        .auth_service
        .register(registration("alice", "b@x.com", "p1"))
        .await;
    assert!(matches!(result, Err(AppError::Conflict("Username"))));
}

#[tokio::test]
async fn test_concurrent_registration_single_winner() {
    let app = setup().await;
    let auth = app.state.auth_service.clone();
    let auth2 = auth.clone();

    let (first, second) = tokio::join!(
        tokio::spawn(async move { auth.register(registration("alice", "a@x.com", "p1")).await }),
        tokio::spawn(async move { auth2.register(registration("alice", "a@x.com", "p1")).await }),
    );
    let results = [first.unwrap(), second.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::Conflict(_))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn test_token_lifetime_boundaries() {
    let app = setup().await;
    let tokens = TokenService::new(&app.config);

    let fresh = tokens
        .issue_at("a@x.com", Utc::now() - Duration::hours(2) - Duration::minutes(59))
        .unwrap();
    assert!(app.state.auth_service.verify_token(&fresh).is_ok());

    let stale = tokens
        .issue_at("a@x.com", Utc::now() - Duration::hours(3) - Duration::minutes(1))
        .unwrap();
    assert!(matches!(
        app.state.auth_service.verify_token(&stale),
        Err(AppError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let app = setup().await;
    let other = Config::new("sqlite::memory:", "a-completely-different-secret-32chars!").unwrap();
    assert_ne!(TEST_SECRET, "a-completely-different-secret-32chars!");

    let token = TokenService::new(&other).issue("a@x.com").unwrap();
    assert!(matches!(
        app.state.auth_service.verify_token(&token),
        Err(AppError::Unauthorized)
    ));
}
