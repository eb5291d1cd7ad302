//! User repository.
//!
//! Queries are written once as functions generic over
//! [`ConnectionTrait`] and shared by the pooled [`UserStore`] and the
//! transaction-bound repository in the unit of work.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by exact email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Overwrite the user's condition field
    async fn update_condition(&self, id: i32, condition: String) -> AppResult<User>;
}

/// Pooled implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        find_by_email(&self.db, email).await
    }

    async fn update_condition(&self, id: i32, condition: String) -> AppResult<User> {
        update_condition(&self.db, id, condition).await
    }
}

pub(crate) async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> AppResult<Option<User>> {
    let result = UserEntity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    Ok(result.map(User::from))
}

pub(crate) async fn email_taken<C: ConnectionTrait>(db: &C, email: &str) -> AppResult<bool> {
    let count = UserEntity::find()
        .filter(user::Column::Email.eq(email))
        .count(db)
        .await?;
    Ok(count > 0)
}

pub(crate) async fn user_name_taken<C: ConnectionTrait>(
    db: &C,
    user_name: &str,
) -> AppResult<bool> {
    let count = UserEntity::find()
        .filter(user::Column::UserName.eq(user_name))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Insert a user. A uniqueness violation reported by the store maps to
/// the same `Conflict` the pre-insert checks produce.
pub(crate) async fn create<C: ConnectionTrait>(db: &C, new_user: NewUser) -> AppResult<User> {
    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        user_name: Set(new_user.user_name),
        first_name: Set(new_user.first_name),
        last_name: Set(new_user.last_name),
        email: Set(new_user.email),
        password_hash: Set(new_user.password_hash),
        mobile_no: Set(new_user.mobile_no),
        address: Set(new_user.address),
        role: Set(new_user.role.to_string()),
        condition: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = active_model.insert(db).await.map_err(map_unique_violation)?;
    Ok(User::from(model))
}

pub(crate) async fn update_condition<C: ConnectionTrait>(
    db: &C,
    id: i32,
    condition: String,
) -> AppResult<User> {
    let user = UserEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let mut active: ActiveModel = user.into();
    active.condition = Set(Some(condition));
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(db).await?;
    Ok(User::from(model))
}

/// Translate unique-index violations on `users` into field conflicts.
///
/// Index names (`uq_users_email`, `uq_users_user_name`) and SQLite's
/// `users.<column>` message both carry the column name.
fn map_unique_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("user_name") => {
            AppError::Conflict("Username")
        }
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
            AppError::Conflict("Email")
        }
        _ => AppError::from(err),
    }
}
