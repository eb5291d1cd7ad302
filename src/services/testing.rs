//! Mock-backed unit of work for service unit tests.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::domain::{User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{
    CartRepository, MockCartRepository, MockOrderRepository, MockUserRepository,
    OrderRepository, TransactionContext, TxFuture, UnitOfWork, UserRepository,
};

/// Wraps repository mocks. Transactions are not available; anything
/// transactional is covered by the in-memory database tests.
pub(crate) struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    carts: Arc<MockCartRepository>,
    orders: Arc<MockOrderRepository>,
}

impl TestUnitOfWork {
    pub(crate) fn new(
        users: MockUserRepository,
        carts: MockCartRepository,
        orders: MockOrderRepository,
    ) -> Self {
        Self {
            users: Arc::new(users),
            carts: Arc::new(carts),
            orders: Arc::new(orders),
        }
    }

    pub(crate) fn with_users(users: MockUserRepository) -> Self {
        Self::new(users, MockCartRepository::new(), MockOrderRepository::new())
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.carts.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }

    async fn transaction_serializable<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

pub(crate) fn test_user(id: i32, email: &str, role: UserRole) -> User {
    User {
        id,
        user_name: format!("user{}", id),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password_hash: String::new(),
        mobile_no: "0700000000".to_string(),
        address: "1 Test Street".to_string(),
        role,
        condition: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
