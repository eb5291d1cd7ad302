//! Authentication handlers.

use axum::{extract::State, middleware, response::Json, routing::post, Extension, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{auth_middleware, CurrentUser};
use crate::api::AppState;
use crate::config::{is_self_assignable_role, ROLE_CUSTOMER};
use crate::domain::{UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::services::{LoginResponse, Registration};
use crate::types::{ApiResponse, Created};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "alice")]
    pub user_name: String,
    #[serde(default)]
    #[schema(example = "Alice")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Liddell")]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "a@x.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "p1")]
    pub password: String,
    #[serde(default)]
    #[schema(example = "12 Rabbit Hole Lane")]
    pub address: String,
    #[serde(default)]
    #[schema(example = "0771234567")]
    pub mobile_no: String,
    /// `customer` (default) or `vendor`
    #[schema(example = "customer")]
    pub role: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(rename = "userEmail")]
    #[validate(length(min = 1, message = "Email and password are required"))]
    #[schema(example = "a@x.com")]
    pub email: String,
    #[serde(rename = "Password")]
    #[validate(length(min = 1, message = "Email and password are required"))]
    #[schema(example = "p1")]
    pub password: String,
}

/// Condition update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConditionRequest {
    #[validate(required(message = "User ID and condition are required"))]
    #[schema(example = 1)]
    pub user_id: Option<i32>,
    #[validate(
        required(message = "User ID and condition are required"),
        length(min = 1, message = "User ID and condition are required")
    )]
    #[schema(example = "verified")]
    pub condition: Option<String>,
}

/// Create authentication routes. Only the condition update needs a token.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/user/condition", post(update_condition))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/register", post(register))
        .route("/login", post(login))
}

fn parse_role(role: Option<&str>) -> AppResult<UserRole> {
    let role = role.map(str::trim).filter(|r| !r.is_empty()).unwrap_or(ROLE_CUSTOMER);
    let role = role.to_ascii_lowercase();

    if !is_self_assignable_role(&role) {
        return Err(AppError::validation("Role must be customer or vendor"));
    }
    Ok(UserRole::from(role.as_str()))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/authenticate/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error, or email or username already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<UserResponse>> {
    let role = parse_role(payload.role.as_deref())?;

    let user = state
        .auth_service
        .register(Registration {
            user_name: payload.user_name,
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password: payload.password,
            mobile_no: payload.mobile_no,
            address: payload.address,
            role,
        })
        .await?;

    Ok(Created::with_message(
        UserResponse::from(user),
        "User registered successfully",
    ))
}

/// Login and get a bearer token
#[utoipa::path(
    post,
    path = "/authenticate/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid password"),
        (status = 404, description = "User not found")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(response))
}

/// Set a user's condition string
#[utoipa::path(
    post,
    path = "/authenticate/user/condition",
    tag = "Authentication",
    request_body = ConditionRequest,
    responses(
        (status = 200, description = "Condition updated", body = UserResponse),
        (status = 400, description = "User ID and condition are required"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the caller's own record"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_condition(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ConditionRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let (Some(user_id), Some(condition)) = (payload.user_id, payload.condition) else {
        return Err(AppError::validation("User ID and condition are required"));
    };

    let actor = current.load(&state).await?;
    let user = state
        .user_service
        .update_condition(&actor, user_id, condition)
        .await?;

    Ok(Json(ApiResponse::with_message(
        UserResponse::from(user),
        "User condition updated",
    )))
}
