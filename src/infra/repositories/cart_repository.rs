//! Cart repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

use super::entities::{cart, cart_item, deal};
use crate::domain::CartLine;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read access to carts outside a transaction.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Priced lines of the user's cart; empty when the user has none.
    async fn contents(&self, user_id: i32) -> AppResult<Vec<CartLine>>;

    /// Whether a deal with this id exists
    async fn deal_exists(&self, food_id: i32) -> AppResult<bool>;
}

pub struct CartStore {
    db: DatabaseConnection,
}

impl CartStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartRepository for CartStore {
    async fn contents(&self, user_id: i32) -> AppResult<Vec<CartLine>> {
        match find_cart_id(&self.db, user_id).await? {
            Some(cart_id) => priced_lines(&self.db, cart_id).await,
            None => Ok(Vec::new()),
        }
    }

    async fn deal_exists(&self, food_id: i32) -> AppResult<bool> {
        deal_exists(&self.db, food_id).await
    }
}

async fn find_cart_id<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> AppResult<Option<i32>> {
    let cart = cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(cart.map(|c| c.id))
}

/// The user's cart row, write-locked until the surrounding transaction
/// ends. SQLite has no row locks and drops the clause.
fn cart_for_update(user_id: i32) -> Select<cart::Entity> {
    cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .lock_exclusive()
}

/// Lock the user's cart, if there is one.
///
/// Every writer of a cart's lines takes this lock first, so a checkout
/// and an add-to-cart on the same cart run one after the other.
pub(crate) async fn lock_cart<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<Option<i32>> {
    let cart = cart_for_update(user_id).one(db).await?;
    Ok(cart.map(|c| c.id))
}

pub(crate) async fn deal_exists<C: ConnectionTrait>(db: &C, food_id: i32) -> AppResult<bool> {
    Ok(deal::Entity::find_by_id(food_id).one(db).await?.is_some())
}

/// Lock the user's cart, creating it if needed.
///
/// The insert yields to a concurrent creator through the unique index on
/// `user_id` (`ON CONFLICT DO NOTHING`), then the row is re-read under
/// the lock. This keeps a surrounding Postgres transaction usable, which
/// a raised constraint error would not.
pub(crate) async fn get_or_create<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<i32> {
    if let Some(cart_id) = lock_cart(db, user_id).await? {
        return Ok(cart_id);
    }

    let model = cart::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    cart::Entity::insert(model)
        .on_conflict(
            OnConflict::column(cart::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    lock_cart(db, user_id).await?.ok_or_else(|| {
        AppError::internal(format!("cart for user {} vanished after insert", user_id))
    })
}

/// Add `quantity` of a food to the cart, incrementing an existing line.
pub(crate) async fn add_item<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
    food_id: i32,
    quantity: i32,
) -> AppResult<()> {
    let model = cart_item::ActiveModel {
        cart_id: Set(cart_id),
        food_id: Set(food_id),
        quantity: Set(quantity),
        ..Default::default()
    };

    cart_item::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([cart_item::Column::CartId, cart_item::Column::FoodId])
                .value(
                    cart_item::Column::Quantity,
                    Expr::col((cart_item::Entity, cart_item::Column::Quantity)).add(quantity),
                )
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Cart lines joined with the deals' current prices, oldest line first.
pub(crate) async fn priced_lines<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
) -> AppResult<Vec<CartLine>> {
    let rows = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .find_also_related(deal::Entity)
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await?;

    rows.into_iter()
        .map(|(item, deal)| {
            let deal = deal.ok_or_else(|| {
                AppError::internal(format!("cart item {} references a missing deal", item.id))
            })?;
            Ok(CartLine {
                food_id: item.food_id,
                food_name: deal.name,
                quantity: item.quantity,
                unit_price: deal.current_price,
            })
        })
        .collect()
}

/// Delete every line of the cart, returning how many rows went away.
pub(crate) async fn clear<C: ConnectionTrait>(db: &C, cart_id: i32) -> AppResult<u64> {
    let result = cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
