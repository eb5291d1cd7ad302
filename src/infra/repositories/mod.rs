//! Repository layer - Data access abstraction
//!
//! Each repository exposes a trait for pooled reads and `pub(crate)`
//! query functions that the unit of work runs inside a transaction.

pub(crate) mod cart_repository;
pub(crate) mod entities;
pub(crate) mod order_repository;
pub(crate) mod user_repository;

pub use cart_repository::{CartRepository, CartStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use cart_repository::MockCartRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
