//! Checkout and order handlers.

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
use crate::domain::{DeliveryOption, Order, PlacedOrder};
use crate::errors::AppResult;

/// Checkout request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    /// Cart owner; defaults to the caller
    #[schema(example = 1)]
    pub user_id: Option<i32>,
    /// Delivery option id
    #[schema(example = 1)]
    pub delivery_option: i32,
    #[validate(length(min = 1, message = "Delivery address is required"))]
    #[schema(example = "12 Rabbit Hole Lane")]
    pub delivery_address: String,
}

/// Order routes. Delivery options are public; the rest need a token.
pub fn order_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/orders/:order_id", get(get_order))
        .route("/orders/user/:user_id", get(list_user_orders))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/delivery-options", get(list_delivery_options))
}

/// Place an order from the cart
#[utoipa::path(
    post,
    path = "/checkout",
    tag = "Orders",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed", body = PlacedOrder),
        (status = 400, description = "Cart is empty, unknown delivery option or invalid body"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Another user's cart")
    ),
    security(("bearer_auth" = []))
)]
pub async fn checkout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CheckoutRequest>,
) -> AppResult<Json<PlacedOrder>> {
    let user_id = current.acting_for(&state, payload.user_id).await?;

    let placed = state
        .order_service
        .checkout(user_id, payload.delivery_option, payload.delivery_address)
        .await?;

    Ok(Json(placed))
}

/// One order with its items
#[utoipa::path(
    get,
    path = "/orders/{order_id}",
    tag = "Orders",
    params(("order_id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Another user's order"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(order_id): Path<i32>,
) -> AppResult<Json<Order>> {
    let viewer = current.load(&state).await?;
    Ok(Json(state.order_service.get_order(&viewer, order_id).await?))
}

/// A user's orders, newest first
#[utoipa::path(
    get,
    path = "/orders/user/{user_id}",
    tag = "Orders",
    params(("user_id" = i32, Path, description = "Order owner")),
    responses(
        (status = 200, description = "Orders, empty when none", body = [Order]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Another user's orders")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_user_orders(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<Order>>> {
    let user_id = current.acting_for(&state, Some(user_id)).await?;
    Ok(Json(state.order_service.list_user_orders(user_id).await?))
}

/// Available delivery options, cheapest first
#[utoipa::path(
    get,
    path = "/delivery-options",
    tag = "Orders",
    responses((status = 200, description = "Delivery options", body = [DeliveryOption]))
)]
pub async fn list_delivery_options(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DeliveryOption>>> {
    Ok(Json(state.order_service.list_delivery_options().await?))
}
