//! Shared setup: a migrated in-memory SQLite database behind the real
//! services.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, ConnectionTrait, Database as SeaDatabase, DbBackend, Statement};
use sea_orm_migration::MigratorTrait;

use quick_deals::config::Config;
use quick_deals::domain::{User, UserRole};
use quick_deals::infra::{Database, Migrator};
use quick_deals::services::Registration;
use quick_deals::AppState;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";

pub struct TestApp {
    pub db: Arc<Database>,
    pub config: Config,
    pub state: AppState,
}

pub async fn setup() -> TestApp {
    // One connection: every pooled connection would open its own
    // in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let connection = SeaDatabase::connect(options)
        .await
        .expect("in-memory sqlite");
    Migrator::up(&connection, None).await.expect("migrations");

    let config = Config::new("sqlite::memory:", TEST_SECRET).expect("config");
    let db = Arc::new(Database::from_connection(connection));
    let state = AppState::from_config(db.clone(), &config);

    TestApp { db, config, state }
}

impl TestApp {
    async fn insert(&self, sql: &str, values: Vec<sea_orm::Value>) -> i32 {
        let result = self
            .db
            .connection()
            .execute(Statement::from_sql_and_values(DbBackend::Sqlite, sql, values))
            .await
            .expect("seed insert");
        result.last_insert_id() as i32
    }

    pub async fn seed_deal(&self, name: &str, price: Decimal) -> i32 {
        self.insert(
            "INSERT INTO deals (name, current_price, quantity_available, created_at) \
             VALUES (?, ?, ?, ?)",
            vec![name.into(), price.into(), 100.into(), Utc::now().into()],
        )
        .await
    }

    pub async fn seed_delivery_option(&self, name: &str, cost: Decimal) -> i32 {
        self.insert(
            "INSERT INTO delivery_options (name, cost) VALUES (?, ?)",
            vec![name.into(), cost.into()],
        )
        .await
    }

    pub async fn set_deal_price(&self, deal_id: i32, price: Decimal) {
        self.db
            .connection()
            .execute(Statement::from_sql_and_values(
                DbBackend::Sqlite,
                "UPDATE deals SET current_price = ? WHERE id = ?",
                vec![price.into(), deal_id.into()],
            ))
            .await
            .expect("price update");
    }

    pub async fn make_admin(&self, user_id: i32) {
        self.db
            .connection()
            .execute(Statement::from_sql_and_values(
                DbBackend::Sqlite,
                "UPDATE users SET role = 'admin' WHERE id = ?",
                vec![user_id.into()],
            ))
            .await
            .expect("role update");
    }

    pub async fn count(&self, table: &str) -> i64 {
        let row = self
            .db
            .connection()
            .query_one(Statement::from_string(
                DbBackend::Sqlite,
                format!("SELECT COUNT(*) AS n FROM {}", table),
            ))
            .await
            .expect("count query")
            .expect("count row");
        row.try_get::<i64>("", "n").expect("count value")
    }

    pub async fn register(&self, user_name: &str, email: &str, password: &str) -> User {
        self.state
            .auth_service
            .register(registration(user_name, email, password))
            .await
            .expect("registration")
    }

    /// Register and log in; returns the user and a bearer token.
    pub async fn signed_in(&self, user_name: &str, email: &str) -> (User, String) {
        let user = self.register(user_name, email, "p1").await;
        let login = self
            .state
            .auth_service
            .login(email.to_string(), "p1".to_string())
            .await
            .expect("login");
        (user, login.token)
    }
}

pub fn registration(user_name: &str, email: &str, password: &str) -> Registration {
    Registration {
        user_name: user_name.to_string(),
        first_name: "Alice".to_string(),
        last_name: "Liddell".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        mobile_no: "0771234567".to_string(),
        address: "12 Rabbit Hole Lane".to_string(),
        role: UserRole::Customer,
    }
}

/// Money helper: `cents(450)` is 4.50.
pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}
