//! Migration to create the products table.

use sea_orm_migration::prelude::*;

use super::m2025_06_01_000001_create_tenants::Tenants;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Products::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(Products::ExternalProductId)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::Title).text().null())
                    .col(ColumnDef::new(Products::Handle).text().null())
                    .col(ColumnDef::new(Products::Vendor).text().null())
                    .col(ColumnDef::new(Products::ProductType).text().null())
                    .col(
                        ColumnDef::new(Products::PriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Products::CompareAtPriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Products::InventoryQuantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Products::Status).text().null())
                    .col(ColumnDef::new(Products::Tags).text().null())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_tenant_id")
                            .from(Products::Table, Products::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_tenant_external")
                    .table(Products::Table)
                    .col(Products::TenantId)
                    .col(Products::ExternalProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    TenantId,
    ExternalProductId,
    Title,
    Handle,
    Vendor,
    ProductType,
    PriceCents,
    CompareAtPriceCents,
    InventoryQuantity,
    Status,
    Tags,
    CreatedAt,
    UpdatedAt,
}
