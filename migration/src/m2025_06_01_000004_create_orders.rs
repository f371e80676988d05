//! Migration to create the orders table.
//!
//! The customer reference is nullable: an order webhook may arrive before (or
//! without) the matching customer webhook, and the order must persist anyway.

use sea_orm_migration::prelude::*;

use super::m2025_06_01_000001_create_tenants::Tenants;
use super::m2025_06_01_000002_create_customers::Customers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Orders::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Orders::ExternalOrderId).text().not_null())
                    .col(ColumnDef::new(Orders::CustomerId).uuid().null())
                    .col(ColumnDef::new(Orders::OrderNumber).text().null())
                    .col(ColumnDef::new(Orders::Email).text().null())
                    .col(
                        ColumnDef::new(Orders::TotalPriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Orders::SubtotalPriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Orders::TotalTaxCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Orders::Currency)
                            .text()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Orders::FinancialStatus).text().null())
                    .col(ColumnDef::new(Orders::FulfillmentStatus).text().null())
                    .col(ColumnDef::new(Orders::Tags).text().null())
                    .col(
                        ColumnDef::new(Orders::PlacedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_tenant_id")
                            .from(Orders::Table, Orders::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_customer_id")
                            .from(Orders::Table, Orders::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_tenant_external")
                    .table(Orders::Table)
                    .col(Orders::TenantId)
                    .col(Orders::ExternalOrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Reporting reads orders per tenant by recency.
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_tenant_placed_at")
                    .table(Orders::Table)
                    .col(Orders::TenantId)
                    .col(Orders::PlacedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Orders {
    Table,
    Id,
    TenantId,
    ExternalOrderId,
    CustomerId,
    OrderNumber,
    Email,
    TotalPriceCents,
    SubtotalPriceCents,
    TotalTaxCents,
    Currency,
    FinancialStatus,
    FulfillmentStatus,
    Tags,
    PlacedAt,
    CreatedAt,
    UpdatedAt,
}
