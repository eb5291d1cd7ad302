//! Service Container - Centralized service access.
//!
//! Handlers depend on the service traits; `Services` wires the concrete
//! implementations around one shared unit of work.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, CartManager, CartService, OrderManager, OrderService,
    TokenService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn orders(&self) -> Arc<dyn OrderService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    cart_service: Arc<dyn CartService>,
    order_service: Arc<dyn OrderService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        cart_service: Arc<dyn CartService>,
        order_service: Arc<dyn OrderService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            cart_service,
            order_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: &Config) -> Self {
        let uow = Arc::new(Persistence::new(db, config.db_transaction_timeout));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), TokenService::new(config))),
            user_service: Arc::new(UserManager::new(uow.clone())),
            cart_service: Arc::new(CartManager::new(uow.clone())),
            order_service: Arc::new(OrderManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }
}
