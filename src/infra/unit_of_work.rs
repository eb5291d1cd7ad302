//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Centralizes access to all repositories
//! - Manages database transactions (begin, commit, rollback)
//! - Bounds how long one transaction may run
//!
//! Registration and checkout run entirely inside [`UnitOfWork::transaction`]:
//! either every statement commits or none does.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use super::repositories::{
    cart_repository, order_repository, user_repository, CartRepository, CartStore,
    OrderRepository, OrderStore, UserRepository, UserStore,
};
use crate::domain::{CartLine, DeliveryOption, NewUser, User};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transaction closures.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Note: This trait is not mockable directly due to generic methods.
/// Tests run it against an in-memory database instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get cart repository
    fn carts(&self) -> Arc<dyn CartRepository>;

    /// Get order repository
    fn orders(&self) -> Arc<dyn OrderRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Commits when the closure returns `Ok`; rolls back on `Err` or when
    /// the closure outlives the configured time budget (`AppError::Timeout`).
    /// Uses ReadCommitted isolation.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;

    /// Execute a closure within a transaction with serializable isolation.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// Everything done through this context belongs to one database
/// transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }

    pub fn carts(&self) -> TxCartRepository<'_> {
        TxCartRepository { txn: self.txn }
    }

    pub fn orders(&self) -> TxOrderRepository<'_> {
        TxOrderRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    transaction_timeout: Duration,
    user_repo: Arc<UserStore>,
    cart_repo: Arc<CartStore>,
    order_repo: Arc<OrderStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection, transaction_timeout: Duration) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            cart_repo: Arc::new(CartStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db.clone())),
            db,
            transaction_timeout,
        }
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await?;

        let outcome =
            tokio::time::timeout(self.transaction_timeout, f(TransactionContext::new(&txn))).await;

        match outcome {
            Ok(Ok(result)) => {
                txn.commit().await?;
                Ok(result)
            }
            Ok(Err(e)) => {
                rollback(txn).await;
                Err(e)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.transaction_timeout.as_millis() as u64,
                    "Transaction exceeded its time budget, rolling back"
                );
                rollback(txn).await;
                Err(AppError::Timeout)
            }
        }
    }
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(rollback_err) = txn.rollback().await {
        tracing::error!("Transaction rollback failed: {}", rollback_err);
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.cart_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f).await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f).await
    }
}

/// Transaction-bound user repository.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxUserRepository<'_> {
    pub async fn email_taken(&self, email: &str) -> AppResult<bool> {
        user_repository::email_taken(self.txn, email).await
    }

    pub async fn user_name_taken(&self, user_name: &str) -> AppResult<bool> {
        user_repository::user_name_taken(self.txn, user_name).await
    }

    /// Insert a user; unique index violations surface as `Conflict`.
    pub async fn create(&self, new_user: NewUser) -> AppResult<User> {
        user_repository::create(self.txn, new_user).await
    }
}

/// Transaction-bound cart repository.
pub struct TxCartRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxCartRepository<'_> {
    /// Lock the user's cart for the rest of the transaction.
    pub async fn lock(&self, user_id: i32) -> AppResult<Option<i32>> {
        cart_repository::lock_cart(self.txn, user_id).await
    }

    /// Lock the user's cart, creating it first if needed.
    pub async fn get_or_create(&self, user_id: i32) -> AppResult<i32> {
        cart_repository::get_or_create(self.txn, user_id).await
    }

    pub async fn add_item(&self, cart_id: i32, food_id: i32, quantity: i32) -> AppResult<()> {
        cart_repository::add_item(self.txn, cart_id, food_id, quantity).await
    }

    pub async fn priced_lines(&self, cart_id: i32) -> AppResult<Vec<CartLine>> {
        cart_repository::priced_lines(self.txn, cart_id).await
    }

    pub async fn clear(&self, cart_id: i32) -> AppResult<u64> {
        cart_repository::clear(self.txn, cart_id).await
    }
}

/// Transaction-bound order repository.
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxOrderRepository<'_> {
    pub async fn find_delivery_option(&self, id: i32) -> AppResult<Option<DeliveryOption>> {
        order_repository::find_delivery_option(self.txn, id).await
    }

    pub async fn create(
        &self,
        user_id: i32,
        total_amount: Decimal,
        delivery_option_id: i32,
        delivery_address: String,
        lines: &[CartLine],
    ) -> AppResult<i32> {
        order_repository::create(
            self.txn,
            user_id,
            total_amount,
            delivery_option_id,
            delivery_address,
            lines,
        )
        .await
    }
}

/// Simpler API for executing transactional operations.
///
/// This helper macro reduces boilerplate when using transactions.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
