//! Centralized error handling.
//!
//! One error type for the whole application, converted to an HTTP
//! response at the boundary. Store and token failures are logged with
//! their detail here and reach the client only as generic messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Unauthorized request")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid password")]
    InvalidCredentials,

    // Resource errors
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness violation; the payload names the clashing field.
    #[error("{0} already exists")]
    Conflict(&'static str),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Cart is empty")]
    EmptyCart,

    // External service errors
    #[error("Database error")]
    Database(#[from] DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Operation timed out")]
    Timeout,

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized | AppError::Jwt(_) => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::EmptyCart => "EMPTY_CART",
            _ if self.is_retryable() => "UNAVAILABLE",
            AppError::Database(_) | AppError::Timeout => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code.
    ///
    /// Uniqueness conflicts answer 400, which existing clients expect for
    /// "email/username already exists".
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Validation(_) | AppError::EmptyCart => {
                StatusCode::BAD_REQUEST
            }
            _ if self.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Timeout | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the caller may simply retry: the store was unreachable or
    /// too slow, and nothing was applied.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Timeout => true,
            AppError::Database(e) => matches!(e, DbErr::ConnectionAcquire(_) | DbErr::Conn(_)),
            _ => false,
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),

            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                if self.is_retryable() {
                    "Service temporarily unavailable, please retry".to_string()
                } else {
                    "Internal server error".to_string()
                }
            }
            AppError::Timeout => {
                tracing::error!("Unit of work exceeded its time budget");
                "Service temporarily unavailable, please retry".to_string()
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT rejected: {:?}", e);
                AppError::Unauthorized.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }

            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &'static str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &'static str) -> AppResult<T> {
        self.ok_or(AppError::NotFound(entity))
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
