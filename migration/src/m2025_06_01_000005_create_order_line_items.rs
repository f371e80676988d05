//! Migration to create the order_line_items table.
//!
//! Line items are exclusively owned by their order: re-delivery of an order
//! webhook replaces the full set, so rows cascade with the order. The title
//! is a point-of-sale snapshot and is independent of the products table.

use sea_orm_migration::prelude::*;

use super::m2025_06_01_000003_create_products::Products;
use super::m2025_06_01_000004_create_orders::Orders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderLineItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderLineItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderLineItems::OrderId).uuid().not_null())
                    .col(ColumnDef::new(OrderLineItems::ProductId).uuid().null())
                    .col(
                        ColumnDef::new(OrderLineItems::ExternalVariantId)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(OrderLineItems::Title).text().null())
                    .col(
                        ColumnDef::new(OrderLineItems::Quantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OrderLineItems::PriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OrderLineItems::TotalDiscountCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_line_items_order_id")
                            .from(OrderLineItems::Table, OrderLineItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_line_items_product_id")
                            .from(OrderLineItems::Table, OrderLineItems::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_line_items_order")
                    .table(OrderLineItems::Table)
                    .col(OrderLineItems::OrderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderLineItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OrderLineItems {
    Table,
    Id,
    OrderId,
    ProductId,
    ExternalVariantId,
    Title,
    Quantity,
    PriceCents,
    TotalDiscountCents,
}
