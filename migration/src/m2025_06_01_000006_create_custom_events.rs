//! Migration to create the custom_events table.
//!
//! Append-only behavioral events (cart abandonment, checkout started,
//! product views) with a structured JSON payload.

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
                    .table(CustomEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CustomEvents::TenantId).uuid().not_null())
                    .col(ColumnDef::new(CustomEvents::CustomerId).uuid().null())
                    .col(ColumnDef::new(CustomEvents::EventType).text().not_null())
                    .col(
                        ColumnDef::new(CustomEvents::EventData)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomEvents::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CustomEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_events_tenant_id")
                            .from(CustomEvents::Table, CustomEvents::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_events_customer_id")
                            .from(CustomEvents::Table, CustomEvents::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_custom_events_tenant_type_occurred")
                    .table(CustomEvents::Table)
                    .col(CustomEvents::TenantId)
                    .col(CustomEvents::EventType)
                    .col(CustomEvents::OccurredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CustomEvents {
    Table,
    Id,
    TenantId,
    CustomerId,
    EventType,
    EventData,
    OccurredAt,
    CreatedAt,
}
