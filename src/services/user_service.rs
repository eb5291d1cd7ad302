//! User service - account lookups and the condition flag.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::User;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Resolve the account behind a token subject.
    async fn get_by_email(&self, email: &str) -> AppResult<User>;

    /// Overwrite the condition string of `user_id`.
    ///
    /// `actor` must be that user or an admin.
    async fn update_condition(
        &self,
        actor: &User,
        user_id: i32,
        condition: String,
    ) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.uow
            .users()
            .find_by_email(email)
            .await?
            .ok_or_not_found("User")
    }

    async fn update_condition(
        &self,
        actor: &User,
        user_id: i32,
        condition: String,
    ) -> AppResult<User> {
        if !actor.can_act_for(user_id) {
            tracing::warn!(actor = actor.id, target_id = user_id, "Condition update refused");
            return Err(AppError::Forbidden);
        }

        let user = self.uow.users().update_condition(user_id, condition).await?;
        tracing::info!(user_id, "User condition updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::MockUserRepository;
    use crate::services::testing::{test_user, TestUnitOfWork};
    use mockall::predicate::eq;

    fn service(repo: MockUserRepository) -> UserManager<TestUnitOfWork> {
        UserManager::new(Arc::new(TestUnitOfWork::with_users(repo)))
    }

    #[tokio::test]
    async fn test_get_by_email_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(test_user(7, email, UserRole::Customer))));

        let user = service(repo).get_by_email("a@x.com").await.unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_get_by_email_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let result = service(repo).get_by_email("ghost@x.com").await;
        assert!(matches!(result, Err(AppError::NotFound("User"))));
    }

    #[tokio::test]
    async fn test_update_own_condition() {
        let mut repo = MockUserRepository::new();
        repo.expect_update_condition()
            .with(eq(5), eq("away".to_string()))
            .times(1)
            .returning(|id, condition| {
                let mut user = test_user(id, "a@x.com", UserRole::Customer);
                user.condition = Some(condition);
                Ok(user)
            });

        let actor = test_user(5, "a@x.com", UserRole::Customer);
        let user = service(repo)
            .update_condition(&actor, 5, "away".to_string())
            .await
            .unwrap();
        assert_eq!(user.condition.as_deref(), Some("away"));
    }

    #[tokio::test]
    async fn test_update_other_users_condition_forbidden() {
        let mut repo = MockUserRepository::new();
        repo.expect_update_condition().never();

        let actor = test_user(5, "a@x.com", UserRole::Vendor);
        let result = service(repo).update_condition(&actor, 6, "x".to_string()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_admin_updates_any_condition() {
        let mut repo = MockUserRepository::new();
        repo.expect_update_condition()
            .times(1)
            .returning(|id, _| Ok(test_user(id, "b@x.com", UserRole::Customer)));

        let admin = test_user(1, "root@x.com", UserRole::Admin);
        assert!(service(repo).update_condition(&admin, 6, "ok".to_string()).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_condition_missing_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_update_condition()
            .returning(|_, _| Err(AppError::NotFound("User")));

        let admin = test_user(1, "root@x.com", UserRole::Admin);
        let result = service(repo).update_condition(&admin, 404, "x".to_string()).await;
        assert!(matches!(result, Err(AppError::NotFound("User"))));
    }
}
