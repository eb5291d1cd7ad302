use sea_orm::entity::prelude::*;

use crate::domain::OrderItem;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_id: i32,
    pub food_id: i32,
    pub quantity: i32,
    /// Deal price copied at checkout; later price changes never reach it
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price_at_purchase: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for OrderItem {
    fn from(model: Model) -> Self {
        OrderItem {
            food_id: model.food_id,
            quantity: model.quantity,
            price_at_purchase: model.price_at_purchase,
        }
    }
}
