//! Order and delivery option repository.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use super::entities::{delivery_option, order, order_item};
use crate::domain::{CartLine, DeliveryOption, Order, OrderItem};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read access to orders outside a transaction.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Order with its lines
    async fn find(&self, order_id: i32) -> AppResult<Option<Order>>;

    /// All orders of a user, newest first
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Order>>;

    /// All delivery options, cheapest first
    async fn delivery_options(&self) -> AppResult<Vec<DeliveryOption>>;
}

pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn find(&self, order_id: i32) -> AppResult<Option<Order>> {
        let rows = order::Entity::find_by_id(order_id)
            .find_with_related(order_item::Entity)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().next().map(to_order))
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Order>> {
        let rows = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::Id)
            .find_with_related(order_item::Entity)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(to_order).collect())
    }

    async fn delivery_options(&self) -> AppResult<Vec<DeliveryOption>> {
        let models = delivery_option::Entity::find()
            .order_by_asc(delivery_option::Column::Cost)
            .order_by_asc(delivery_option::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(DeliveryOption::from).collect())
    }
}

fn to_order((header, items): (order::Model, Vec<order_item::Model>)) -> Order {
    Order {
        order_id: header.id,
        user_id: header.user_id,
        total_amount: header.total_amount,
        delivery_option_id: header.delivery_option_id,
        delivery_address: header.delivery_address,
        created_at: header.created_at,
        items: items.into_iter().map(OrderItem::from).collect(),
    }
}

pub(crate) async fn find_delivery_option<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<Option<DeliveryOption>> {
    let model = delivery_option::Entity::find_by_id(id).one(db).await?;
    Ok(model.map(DeliveryOption::from))
}

/// Insert the order header and one item per cart line, copying each
/// line's current price. Returns the new order id.
pub(crate) async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    total_amount: Decimal,
    delivery_option_id: i32,
    delivery_address: String,
    lines: &[CartLine],
) -> AppResult<i32> {
    let header = order::ActiveModel {
        user_id: Set(user_id),
        total_amount: Set(total_amount),
        delivery_option_id: Set(delivery_option_id),
        delivery_address: Set(delivery_address),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let items = lines.iter().map(|line| order_item::ActiveModel {
        order_id: Set(header.id),
        food_id: Set(line.food_id),
        quantity: Set(line.quantity),
        price_at_purchase: Set(line.unit_price),
        ..Default::default()
    });

    let inserted = order_item::Entity::insert_many(items)
        .exec_without_returning(db)
        .await?;

    if inserted != lines.len() as u64 {
        return Err(AppError::internal(format!(
            "order {} stored {} of {} items",
            header.id,
            inserted,
            lines.len()
        )));
    }

    Ok(header.id)
}
