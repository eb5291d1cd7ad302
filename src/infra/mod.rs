//! Infrastructure layer - External systems integration
//!
//! - Database connection and migrations
//! - SeaORM entities and repositories
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    CartRepository, CartStore, OrderRepository, OrderStore, UserRepository, UserStore,
};
pub use unit_of_work::{
    Persistence, TransactionContext, TxCartRepository, TxFuture, TxOrderRepository,
    TxUserRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockCartRepository, MockOrderRepository, MockUserRepository};
