//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{ROLE_ADMIN, ROLE_CUSTOMER, ROLE_VENDOR};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Vendor,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            ROLE_VENDOR => UserRole::Vendor,
            _ => UserRole::Customer,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            UserRole::Customer => ROLE_CUSTOMER,
            UserRole::Vendor => ROLE_VENDOR,
            UserRole::Admin => ROLE_ADMIN,
        };
        f.write_str(role)
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub mobile_no: String,
    pub address: String,
    pub role: UserRole,
    /// Opaque status string, set through the condition endpoint
    pub condition: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this user may act on records owned by `user_id`.
    pub fn can_act_for(&self, user_id: i32) -> bool {
        self.id == user_id || self.is_admin()
    }
}

/// Registration data, with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile_no: String,
    pub address: String,
    pub role: UserRole,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub user_id: i32,
    #[schema(example = "alice")]
    pub user_name: String,
    #[schema(example = "Alice")]
    pub first_name: String,
    #[schema(example = "Liddell")]
    pub last_name: String,
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "0771234567")]
    pub mobile_no: String,
    #[schema(example = "12 Rabbit Hole Lane")]
    pub address: String,
    #[schema(example = "customer")]
    pub role: String,
    pub condition: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            user_name: user.user_name,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            mobile_no: user.mobile_no,
            address: user.address,
            role: user.role.to_string(),
            condition: user.condition,
            created_at: user.created_at,
        }
    }
}
