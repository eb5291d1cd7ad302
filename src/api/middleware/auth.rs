//! Bearer token authentication middleware.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::{BEARER_SCHEME, NULL_TOKEN_LITERAL};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

/// Token subject attached to authenticated requests.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub email: String,
}

impl CurrentUser {
    /// Load the account behind the token.
    ///
    /// A valid token whose account no longer exists is treated as an
    /// invalid token.
    pub async fn load(&self, state: &AppState) -> AppResult<User> {
        match state.user_service.get_by_email(&self.email).await {
            Err(AppError::NotFound(_)) => Err(AppError::Unauthorized),
            other => other,
        }
    }

    /// Resolve which user's records a request targets.
    ///
    /// Defaults to the caller; any other id requires the caller to be an
    /// admin.
    pub async fn acting_for(&self, state: &AppState, requested: Option<i32>) -> AppResult<i32> {
        let caller = self.load(state).await?;
        let target = requested.unwrap_or(caller.id);

        if !caller.can_act_for(target) {
            tracing::warn!(
                caller = caller.id,
                target_id = target,
                "Access to another user's records refused"
            );
            return Err(AppError::Forbidden);
        }
        Ok(target)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// Returns `None` for a missing header, another scheme, an empty token or
/// the literal `null` some clients send when logged out.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme != BEARER_SCHEME || token.is_empty() || token == NULL_TOKEN_LITERAL {
        return None;
    }
    Some(token)
}

/// Rejects the request with 401 unless it carries a valid bearer token,
/// then injects the CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let claims = state.auth_service.verify_token(token)?;

    request.extensions_mut().insert(CurrentUser {
        email: claims.subject,
    });

    Ok(next.run(request).await)
}
