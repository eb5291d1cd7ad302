//! Transaction guarantees of the persistence layer: unique indexes and
//! the per-transaction time budget.

mod common;

use std::time::Duration;

use common::setup;
use quick_deals::domain::{NewUser, UserRole};
use quick_deals::errors::AppError;
use quick_deals::infra::{Persistence, UnitOfWork};
use quick_deals::with_transaction;

fn new_user(user_name: &str, email: &str) -> NewUser {
    NewUser {
        user_name: user_name.to_string(),
        first_name: "Alice".to_string(),
        last_name: "Liddell".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        mobile_no: "0771234567".to_string(),
        address: "12 Rabbit Hole Lane".to_string(),
        role: UserRole::Customer,
    }
}

#[tokio::test]
async fn test_duplicate_email_rejected_by_unique_index() {
    let app = setup().await;
    let uow = Persistence::new(app.db.get_connection(), Duration::from_secs(5));

    let first = new_user("alice", "a@x.com");
    with_transaction!(uow, |ctx| { ctx.users().create(first).await }).unwrap();

    // No pre-insert check here: only the index stands in the way.
    let second = new_user("bob", "a@x.com");
    let result = with_transaction!(uow, |ctx| { ctx.users().create(second).await });

    assert!(matches!(result, Err(AppError::Conflict("Email"))));
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn test_duplicate_user_name_rejected_by_unique_index() {
    let app = setup().await;
    let uow = Persistence::new(app.db.get_connection(), Duration::from_secs(5));

    let first = new_user("alice", "a@x.com");
    with_transaction!(uow, |ctx| { ctx.users().create(first).await }).unwrap();

    let second = new_user("alice", "b@x.com");
    let result = with_transaction!(uow, |ctx| { ctx.users().create(second).await });

    assert!(matches!(result, Err(AppError::Conflict("Username"))));
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn test_transaction_over_budget_rolls_back() {
    let app = setup().await;
    let uow = Persistence::new(app.db.get_connection(), Duration::from_millis(100));

    let user = new_user("alice", "a@x.com");
    let result = with_transaction!(uow, |ctx| {
        let created = ctx.users().create(user).await?;
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(created)
    });

    assert!(matches!(result, Err(AppError::Timeout)));
    assert!(AppError::Timeout.is_retryable());
    assert_eq!(app.count("users").await, 0);
}
