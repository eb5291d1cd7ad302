//! Password value object - Domain layer password handling.
//!
//! New hashes are Argon2id PHC strings, which carry their own salt and
//! cost parameters. Rows written by the previous deployment hold bcrypt
//! hashes (`$2a$`/`$2b$`/`$2y$`); those still verify.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

const BCRYPT_PREFIXES: &[&str] = &["$2a$", "$2b$", "$2y$"];

/// Password value object that handles hashing and verification.
///
/// Holds only the hash. There is no way to compare two plain texts
/// through this type.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns a validation error if the password is empty, or an
    /// internal error if the hasher fails.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation("Password is required"));
        }

        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// A stored value that is not a recognisable hash never verifies.
    pub fn verify(&self, plain_text: &str) -> bool {
        if self.is_legacy_bcrypt() {
            return bcrypt::verify(plain_text, &self.hash).unwrap_or(false);
        }
        Self::verify_argon2(plain_text, &self.hash).unwrap_or(false)
    }

    /// Whether this hash was produced by the bcrypt scheme.
    pub fn is_legacy_bcrypt(&self) -> bool {
        BCRYPT_PREFIXES.iter().any(|p| self.hash.starts_with(p))
    }

    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_argon2(plain_text: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
        Ok(Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "SecurePassword123!";
        let password = Password::new(plain).unwrap();

        assert!(password.verify(plain));
        assert!(!password.verify("WrongPassword123"));
    }

    #[test]
    fn test_hash_never_equals_plain_text() {
        let password = Password::new("p1").unwrap();
        assert_ne!(password.as_str(), "p1");
        assert!(password.as_str().starts_with("$argon2id$"));
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "TestPassword123";
        let hash = Password::new(plain).unwrap().into_string();

        let restored = Password::from_hash(hash);
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "SamePassword123";
        let pass1 = Password::new(plain).unwrap();
        let pass2 = Password::new(plain).unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(Password::new(""), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_legacy_bcrypt_hash_verifies() {
        let legacy = bcrypt::hash("p1", 4).unwrap();
        let stored = Password::from_hash(legacy);

        assert!(stored.is_legacy_bcrypt());
        assert!(stored.verify("p1"));
        assert!(!stored.verify("wrong"));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        // A plaintext value left in the column must not match itself.
        let stored = Password::from_hash("p1".to_string());
        assert!(!stored.verify("p1"));

        let truncated = Password::from_hash("$2b$10$short".to_string());
        assert!(!truncated.verify("p1"));
    }
}
