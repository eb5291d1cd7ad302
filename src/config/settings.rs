//! Application settings loaded from environment variables.

use std::env;
use std::time::Duration;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_DB_ACQUIRE_TIMEOUT_SECS, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_DB_TRANSACTION_TIMEOUT_SECS, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, MAX_JWT_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Secret used by debug builds when none is configured.
const DEV_JWT_SECRET: &str = "dev-secret-key-minimum-32-chars!!";

/// Application configuration.
///
/// Built once at startup and handed to the services; nothing below the
/// `commands` layer reads the process environment.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_transaction_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout", &self.db_acquire_timeout)
            .field("db_transaction_timeout", &self.db_transaction_timeout)
            .finish()
    }
}

impl Config {
    /// Create a configuration with defaults for everything but the store
    /// URL and the signing secret.
    ///
    /// # Errors
    /// Returns a validation error if the secret is shorter than
    /// `MIN_JWT_SECRET_LENGTH`.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> AppResult<Self> {
        let jwt_secret = jwt_secret.into();
        validate_secret(&jwt_secret)?;

        Ok(Self {
            database_url: database_url.into(),
            jwt_secret,
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            db_acquire_timeout: Duration::from_secs(DEFAULT_DB_ACQUIRE_TIMEOUT_SECS),
            db_transaction_timeout: Duration::from_secs(DEFAULT_DB_TRANSACTION_TIMEOUT_SECS),
        })
    }

    /// Load configuration from environment variables (and `.env`).
    ///
    /// `JWT_SECRET` is preferred; `SecretKey` is read as a fallback so
    /// existing deployments keep their key. Release builds refuse to start
    /// without one.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET").or_else(|_| env::var("SecretKey")) {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                DEV_JWT_SECRET.to_string()
            }
            Err(_) => {
                return Err(AppError::validation(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let mut config = Self::new(database_url, jwt_secret)?;
        config.jwt_expiration_hours = validate_expiration(parse_var(
            "JWT_EXPIRATION_HOURS",
            DEFAULT_JWT_EXPIRATION_HOURS,
        ))?;
        config.server_host =
            env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string());
        config.server_port = parse_var("SERVER_PORT", DEFAULT_SERVER_PORT);
        config.db_max_connections = parse_var("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        config.db_acquire_timeout = Duration::from_secs(parse_var(
            "DB_ACQUIRE_TIMEOUT_SECS",
            DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
        ));
        config.db_transaction_timeout = Duration::from_secs(parse_var(
            "DB_TRANSACTION_TIMEOUT_SECS",
            DEFAULT_DB_TRANSACTION_TIMEOUT_SECS,
        ));

        Ok(config)
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn validate_secret(secret: &str) -> AppResult<()> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(AppError::validation(format!(
            "JWT_SECRET must be at least {} characters long",
            MIN_JWT_SECRET_LENGTH
        )));
    }
    Ok(())
}

fn validate_expiration(hours: i64) -> AppResult<i64> {
    if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&hours) {
        return Err(AppError::validation(format!(
            "JWT_EXPIRATION_HOURS must be between 1 and {}",
            MAX_JWT_EXPIRATION_HOURS
        )));
    }
    Ok(hours)
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
