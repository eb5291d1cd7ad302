use sea_orm::entity::prelude::*;

use crate::domain::DeliveryOption;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "delivery_options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub cost: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DeliveryOption {
    fn from(model: Model) -> Self {
        DeliveryOption {
            id: model.id,
            name: model.name,
            cost: model.cost,
        }
    }
}
