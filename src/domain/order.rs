//! Cart and order value types, and the order total rule.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// One cart row priced at the deal's current price.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartLine {
    #[schema(example = 3)]
    pub food_id: i32,
    #[schema(example = "Margherita pizza")]
    pub food_name: String,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(value_type = String, example = "4.50")]
    pub unit_price: Decimal,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// A user's cart as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartContents {
    pub user_id: i32,
    pub items: Vec<CartLine>,
    #[schema(value_type = String, example = "9.00")]
    pub subtotal: Decimal,
}

impl CartContents {
    pub fn new(user_id: i32, items: Vec<CartLine>) -> Self {
        let subtotal = items.iter().map(CartLine::line_total).sum();
        Self {
            user_id,
            items,
            subtotal,
        }
    }

    /// An empty cart, also used when the user never created one.
    pub fn empty(user_id: i32) -> Self {
        Self::new(user_id, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeliveryOption {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Standard")]
    pub name: String,
    #[schema(value_type = String, example = "2.50")]
    pub cost: Decimal,
}

/// Order total: every line at its checkout price, plus delivery.
pub fn order_total(lines: &[CartLine], delivery_cost: Decimal) -> Decimal {
    lines.iter().map(CartLine::line_total).sum::<Decimal>() + delivery_cost
}

/// Order line with the price copied at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderItem {
    pub food_id: i32,
    pub quantity: i32,
    #[schema(value_type = String, example = "4.50")]
    pub price_at_purchase: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub order_id: i32,
    pub user_id: i32,
    #[schema(value_type = String, example = "11.50")]
    pub total_amount: Decimal,
    pub delivery_option_id: i32,
    pub delivery_address: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlacedOrder {
    #[schema(example = 42)]
    pub order_id: i32,
    #[schema(value_type = String, example = "11.50")]
    pub total_amount: Decimal,
}
