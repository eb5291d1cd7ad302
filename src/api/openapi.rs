//! OpenAPI documentation, served through Swagger UI.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, cart_handler, order_handler};
use crate::domain::{
    CartContents, CartLine, DeliveryOption, Order, OrderItem, PlacedOrder, UserResponse, UserRole,
};
use crate::services::LoginResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quick Deals",
        version = "0.1.0",
        description = "Marketplace backend: accounts, carts and checkout"
    ),
    servers((url = "http://localhost:3001", description = "Local development server")),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::update_condition,
        cart_handler::add_to_cart,
        cart_handler::get_cart,
        order_handler::checkout,
        order_handler::get_order,
        order_handler::list_user_orders,
        order_handler::list_delivery_options,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            LoginResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::ConditionRequest,
            CartLine,
            CartContents,
            cart_handler::AddToCartRequest,
            DeliveryOption,
            Order,
            OrderItem,
            PlacedOrder,
            order_handler::CheckoutRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and account condition"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Orders", description = "Checkout, order history and delivery options")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /authenticate/login"))
                        .build(),
                ),
            );
        }
    }
}
