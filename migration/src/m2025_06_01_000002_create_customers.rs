//! Migration to create the customers table.
//!
//! Customers are upserted from customer webhooks, keyed by the store-assigned
//! external id within a tenant. Monetary aggregates are stored as cents.

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
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(Customers::ExternalCustomerId)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Customers::Email).text().null())
                    .col(ColumnDef::new(Customers::FirstName).text().null())
                    .col(ColumnDef::new(Customers::LastName).text().null())
                    .col(ColumnDef::new(Customers::Phone).text().null())
                    .col(
                        ColumnDef::new(Customers::TotalSpentCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::OrdersCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::AcceptsMarketing)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Customers::State).text().null())
                    .col(ColumnDef::new(Customers::Tags).text().null())
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Customers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_tenant_id")
                            .from(Customers::Table, Customers::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // (tenant, external id) is the idempotency key for customer upserts.
        manager
            .create_index(
                Index::create()
                    .name("idx_customers_tenant_external")
                    .table(Customers::Table)
                    .col(Customers::TenantId)
                    .col(Customers::ExternalCustomerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Customers {
    Table,
    Id,
    TenantId,
    ExternalCustomerId,
    Email,
    FirstName,
    LastName,
    Phone,
    TotalSpentCents,
    OrdersCount,
    AcceptsMarketing,
    State,
    Tags,
    CreatedAt,
    UpdatedAt,
}
