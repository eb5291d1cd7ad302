//! Migration: deals and delivery options.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Deals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Deals::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Deals::CurrentPrice).decimal_len(10, 2).not_null())
                    .col(
                        ColumnDef::new(Deals::QuantityAvailable)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Deals::ExpiresAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Deals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeliveryOptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeliveryOptions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeliveryOptions::Name).string_len(100).not_null())
                    .col(ColumnDef::new(DeliveryOptions::Cost).decimal_len(10, 2).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeliveryOptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deals::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Deals {
    Table,
    Id,
    Name,
    CurrentPrice,
    QuantityAvailable,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
pub(super) enum DeliveryOptions {
    Table,
    Id,
    Name,
    Cost,
}
