//! Application services layer - Use cases and business logic.
//!
//! Services depend on the `UnitOfWork` abstraction for repository access
//! and transactions. Handlers only see the service traits.

mod auth_service;
mod cart_service;
pub mod container;
mod order_service;
mod token_service;
mod user_service;

#[cfg(test)]
pub(crate) mod testing;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AuthService, Authenticator, LoginResponse, Registration};
pub use cart_service::{CartManager, CartService};
pub use order_service::{OrderManager, OrderService};
pub use token_service::{Claims, TokenService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
