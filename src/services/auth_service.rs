//! Authentication service - login and registration.
//!
//! Password hashing goes through the domain `Password` value object and
//! runs on the blocking pool. Registration is one transaction backed by
//! unique indexes, so two racing sign-ups cannot both win.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::token_service::{Claims, TokenService};
use crate::domain::{NewUser, Password, User, UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// Hash compared against when the email is unknown, so both login
/// failure paths pay for one verification.
static DUMMY_PASSWORD: Lazy<Option<Password>> =
    Lazy::new(|| Password::new("quick-deals-timing-equaliser").ok());

/// Successful login payload
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Login successful")]
    pub message: String,
    pub user: UserResponse,
    /// Bearer token, valid for three hours
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = 10800)]
    pub expires_in: i64,
}

/// Registration input with the password still in plain text.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub mobile_no: String,
    pub address: String,
    pub role: UserRole,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user. No token is issued; the client logs in next.
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Check credentials and issue a bearer token.
    ///
    /// Unknown email is `NotFound("User")`; a known email with the wrong
    /// password is always `InvalidCredentials`.
    async fn login(&self, email: String, password: String) -> AppResult<LoginResponse>;

    /// Verify a bearer token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    tokens: TokenService,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, tokens: TokenService) -> Self {
        Self { uow, tokens }
    }
}

async fn hash_password(plain: String) -> AppResult<Password> {
    tokio::task::spawn_blocking(move || Password::new(&plain))
        .await
        .map_err(|e| AppError::internal(format!("password hashing task failed: {}", e)))?
}

async fn verify_password(stored: Option<Password>, plain: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || {
        let matched = stored.as_ref().map(|p| p.verify(&plain)).unwrap_or(false);
        if stored.is_none() {
            if let Some(dummy) = DUMMY_PASSWORD.as_ref() {
                dummy.verify(&plain);
            }
        }
        matched
    })
    .await
    .map_err(|e| AppError::internal(format!("password verification task failed: {}", e)))
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        let password_hash = hash_password(registration.password).await?.into_string();

        let new_user = NewUser {
            user_name: registration.user_name,
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            password_hash,
            mobile_no: registration.mobile_no,
            address: registration.address,
            role: registration.role,
        };

        let user = with_transaction!(self.uow, |ctx| {
            let users = ctx.users();
            if users.email_taken(&new_user.email).await? {
                return Err(AppError::Conflict("Email"));
            }
            if users.user_name_taken(&new_user.user_name).await? {
                return Err(AppError::Conflict("Username"));
            }
            users.create(new_user).await
        })?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<LoginResponse> {
        let user = self.uow.users().find_by_email(&email).await?;
        let stored = user.as_ref().map(|u| Password::from_hash(u.password_hash.clone()));

        let password_valid = verify_password(stored, password).await?;

        let user = user.ok_or(AppError::NotFound("User"))?;
        if !password_valid {
            tracing::debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.email)?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            user: UserResponse::from(user),
            token,
            expires_in: self.tokens.ttl_seconds(),
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        self.tokens.verify(token)
    }
}
