//! Bearer token issue and verification (HS256 JWT).
//!
//! Keys are derived once from the configured secret. Every verification
//! failure (malformed, bad signature, expired) collapses into
//! `AppError::Unauthorized`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// JWT claims payload. `subject` is the user's email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub subject: String,
    pub exp: i64,
    pub iat: i64,
}

/// Signs and checks bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is dead the second its lifetime ends.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret_bytes()),
            validation,
            ttl: Duration::hours(config.jwt_expiration_hours),
        }
    }

    /// Token lifetime in seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for `subject`, valid from now.
    pub fn issue(&self, subject: &str) -> AppResult<String> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`.
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> AppResult<String> {
        let claims = Claims {
            subject: subject.to_string(),
            exp: (issued_at + self.ttl).timestamp(),
            iat: issued_at.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "Bearer token rejected");
                AppError::Unauthorized
            })
    }
}
