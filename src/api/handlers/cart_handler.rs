//! Cart handlers. Every route needs a bearer token.

use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{auth_middleware, CurrentUser};
use crate::api::AppState;
use crate::domain::CartContents;
use crate::errors::AppResult;

/// Add-to-cart request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddToCartRequest {
    /// Cart owner; defaults to the caller
    #[schema(example = 1)]
    pub user_id: Option<i32>,
    #[schema(example = 3)]
    pub food_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 2, minimum = 1)]
    pub quantity: i32,
}

pub fn cart_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/cart/add", post(add_to_cart))
        .route("/cart/:user_id", get(get_cart))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Add a deal to a cart
#[utoipa::path(
    post,
    path = "/cart/add",
    tag = "Cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartContents),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Another user's cart"),
        (status = 404, description = "Deal not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddToCartRequest>,
) -> AppResult<Json<CartContents>> {
    let user_id = current.acting_for(&state, payload.user_id).await?;

    let cart = state
        .cart_service
        .add_to_cart(user_id, payload.food_id, payload.quantity)
        .await?;

    Ok(Json(cart))
}

/// Cart contents at current prices
#[utoipa::path(
    get,
    path = "/cart/{user_id}",
    tag = "Cart",
    params(("user_id" = i32, Path, description = "Cart owner")),
    responses(
        (status = 200, description = "Cart contents, empty when none", body = CartContents),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Another user's cart")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<CartContents>> {
    let user_id = current.acting_for(&state, Some(user_id)).await?;
    Ok(Json(state.cart_service.get_cart(user_id).await?))
}
