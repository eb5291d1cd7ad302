//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AuthService, CartService, OrderService, ServiceContainer, Services, UserService,
};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub cart_service: Arc<dyn CartService>,
    pub order_service: Arc<dyn OrderService>,
    /// Database handle, used by the health check
    pub database: Arc<Database>,
}

impl AppState {
    /// Build every service over the given database.
    pub fn from_config(database: Arc<Database>, config: &Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);
        Self::from_container(&container, database)
    }

    /// Take services from any container, e.g. a mock one in tests.
    pub fn from_container(container: &dyn ServiceContainer, database: Arc<Database>) -> Self {
        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            cart_service: container.carts(),
            order_service: container.orders(),
            database,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockUserRepository;
    use crate::services::testing::TestUnitOfWork;
    use crate::services::{
        Authenticator, CartManager, MockServiceContainer, OrderManager, TokenService, UserManager,
    };
    use sea_orm::DatabaseConnection;

    #[test]
    fn test_state_takes_every_service_from_container() {
        let config =
            Config::new("sqlite::memory:", "test-secret-key-for-testing-only-32chars").unwrap();
        let uow = Arc::new(TestUnitOfWork::with_users(MockUserRepository::new()));

        let auth: Arc<dyn AuthService> =
            Arc::new(Authenticator::new(uow.clone(), TokenService::new(&config)));
        let users: Arc<dyn UserService> = Arc::new(UserManager::new(uow.clone()));
        let carts: Arc<dyn CartService> = Arc::new(CartManager::new(uow.clone()));
        let orders: Arc<dyn OrderService> = Arc::new(OrderManager::new(uow));

        let mut container = MockServiceContainer::new();
        container.expect_auth().times(1).return_const(auth);
        container.expect_users().times(1).return_const(users);
        container.expect_carts().times(1).return_const(carts);
        container.expect_orders().times(1).return_const(orders);

        let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));
        let state = AppState::from_container(&container, database);

        assert!(state.auth_service.verify_token("null").is_err());
    }
}
