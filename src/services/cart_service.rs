//! Cart service - adding deals to a user's cart and reading it back.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::MIN_CART_QUANTITY;
use crate::domain::CartContents;
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::with_transaction;

#[async_trait]
pub trait CartService: Send + Sync {
    /// Add `quantity` of a deal to the user's cart, creating the cart on
    /// first use. Re-adding a deal grows the existing line.
    async fn add_to_cart(
        &self,
        user_id: i32,
        food_id: i32,
        quantity: i32,
    ) -> AppResult<CartContents>;

    /// Current cart, priced at today's deal prices. A user without a
    /// cart gets an empty one.
    async fn get_cart(&self, user_id: i32) -> AppResult<CartContents>;
}

pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn add_to_cart(
        &self,
        user_id: i32,
        food_id: i32,
        quantity: i32,
    ) -> AppResult<CartContents> {
        if quantity < MIN_CART_QUANTITY {
            return Err(AppError::validation(format!(
                "Quantity must be at least {}",
                MIN_CART_QUANTITY
            )));
        }
        if !self.uow.carts().deal_exists(food_id).await? {
            return Err(AppError::NotFound("Deal"));
        }

        let lines = with_transaction!(self.uow, |ctx| {
            let carts = ctx.carts();
            let cart_id = carts.get_or_create(user_id).await?;
            carts.add_item(cart_id, food_id, quantity).await?;
            carts.priced_lines(cart_id).await
        })?;

        tracing::debug!(user_id, food_id, quantity, "Deal added to cart");
        Ok(CartContents::new(user_id, lines))
    }

    async fn get_cart(&self, user_id: i32) -> AppResult<CartContents> {
        let lines = self.uow.carts().contents(user_id).await?;
        Ok(CartContents::new(user_id, lines))
    }
}
