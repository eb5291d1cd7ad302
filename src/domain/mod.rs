//! Domain layer - Core business entities and logic
//!
//! Users and their credentials, carts, orders and the total rule.
//! Nothing here touches the database or HTTP.

pub mod order;
pub mod password;
pub mod user;

pub use order::{
    order_total, CartContents, CartLine, DeliveryOption, Order, OrderItem, PlacedOrder,
};
pub use password::Password;
pub use user::{NewUser, User, UserResponse, UserRole};
