//! Order service - checkout and order history.
//!
//! Checkout locks the cart, prices it, writes the order with its items
//! and clears the cart in one transaction. The cart lock keeps
//! add-to-cart out until the order commits. A second, concurrent checkout
//! finds nothing left to delete and rolls back with `EmptyCart`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{order_total, DeliveryOption, Order, PlacedOrder, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::with_transaction;

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Turn the user's cart into an order.
    async fn checkout(
        &self,
        user_id: i32,
        delivery_option_id: i32,
        delivery_address: String,
    ) -> AppResult<PlacedOrder>;

    /// One order, visible to its owner and admins.
    async fn get_order(&self, viewer: &User, order_id: i32) -> AppResult<Order>;

    /// A user's orders, newest first. Empty when there are none.
    async fn list_user_orders(&self, user_id: i32) -> AppResult<Vec<Order>>;

    async fn list_delivery_options(&self) -> AppResult<Vec<DeliveryOption>>;
}

pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn checkout(
        &self,
        user_id: i32,
        delivery_option_id: i32,
        delivery_address: String,
    ) -> AppResult<PlacedOrder> {
        let placed = with_transaction!(self.uow, |ctx| {
            let carts = ctx.carts();
            let cart_id = carts.lock(user_id).await?.ok_or(AppError::EmptyCart)?;

            let lines = carts.priced_lines(cart_id).await?;
            if lines.is_empty() {
                return Err(AppError::EmptyCart);
            }

            let orders = ctx.orders();
            let delivery = orders
                .find_delivery_option(delivery_option_id)
                .await?
                .ok_or_else(|| AppError::validation("Unknown delivery option"))?;

            let total_amount = order_total(&lines, delivery.cost);
            let order_id = orders
                .create(user_id, total_amount, delivery.id, delivery_address, &lines)
                .await?;

            let cleared = carts.clear(cart_id).await?;
            if cleared == 0 {
                // Another checkout emptied the cart after we read it.
                return Err(AppError::EmptyCart);
            }
            if cleared != lines.len() as u64 {
                return Err(AppError::internal(format!(
                    "cart {} changed during checkout: read {} lines, cleared {}",
                    cart_id,
                    lines.len(),
                    cleared
                )));
            }

            Ok(PlacedOrder {
                order_id,
                total_amount,
            })
        })?;

        tracing::info!(
            user_id,
            order_id = placed.order_id,
            total = %placed.total_amount,
            "Order placed"
        );
        Ok(placed)
    }

    async fn get_order(&self, viewer: &User, order_id: i32) -> AppResult<Order> {
        let order = self
            .uow
            .orders()
            .find(order_id)
            .await?
            .ok_or(AppError::NotFound("Order"))?;

        if !viewer.can_act_for(order.user_id) {
            return Err(AppError::Forbidden);
        }
        Ok(order)
    }

    async fn list_user_orders(&self, user_id: i32) -> AppResult<Vec<Order>> {
        self.uow.orders().list_for_user(user_id).await
    }

    async fn list_delivery_options(&self) -> AppResult<Vec<DeliveryOption>> {
        self.uow.orders().delivery_options().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderItem, UserRole};
    use crate::infra::{MockCartRepository, MockOrderRepository, MockUserRepository};
    use crate::services::testing::{test_user, TestUnitOfWork};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn service(orders: MockOrderRepository) -> OrderManager<TestUnitOfWork> {
        OrderManager::new(Arc::new(TestUnitOfWork::new(
            MockUserRepository::new(),
            MockCartRepository::new(),
            orders,
        )))
    }

    fn order_of(user_id: i32) -> Order {
        Order {
            order_id: 10,
            user_id,
            total_amount: Decimal::new(1150, 2),
            delivery_option_id: 1,
            delivery_address: "1 Test Street".into(),
            created_at: Utc::now(),
            items: vec![OrderItem {
                food_id: 3,
                quantity: 2,
                price_at_purchase: Decimal::new(450, 2),
            }],
        }
    }

    #[tokio::test]
    async fn test_owner_sees_order() {
        let mut orders = MockOrderRepository::new();
        orders.expect_find().returning(|_| Ok(Some(order_of(4))));

        let viewer = test_user(4, "a@x.com", UserRole::Customer);
        let order = service(orders).get_order(&viewer, 10).await.unwrap();
        assert_eq!(order.items.len(), 1);
    }

    #[tokio::test]
    async fn test_other_user_forbidden() {
        let mut orders = MockOrderRepository::new();
        orders.expect_find().returning(|_| Ok(Some(order_of(4))));

        let viewer = test_user(5, "b@x.com", UserRole::Customer);
        let result = service(orders).get_order(&viewer, 10).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_missing_order_not_found() {
        let mut orders = MockOrderRepository::new();
        orders.expect_find().returning(|_| Ok(None));

        let viewer = test_user(1, "root@x.com", UserRole::Admin);
        let result = service(orders).get_order(&viewer, 77).await;
        assert!(matches!(result, Err(AppError::NotFound("Order"))));
    }

    #[tokio::test]
    async fn test_no_orders_is_empty_list() {
        let mut orders = MockOrderRepository::new();
        orders.expect_list_for_user().returning(|_| Ok(Vec::new()));

        assert!(service(orders).list_user_orders(4).await.unwrap().is_empty());
    }
}
