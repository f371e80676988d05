//! Migration to create the webhook_logs table.
//!
//! Every inbound webhook is recorded here, successful or not. The tenant
//! column is nullable so events from unknown domains still leave a trail.

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
                    .table(WebhookLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WebhookLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WebhookLogs::TenantId).uuid().null())
                    .col(ColumnDef::new(WebhookLogs::WebhookType).text().not_null())
                    .col(
                        ColumnDef::new(WebhookLogs::Payload)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WebhookLogs::Processed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(WebhookLogs::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(WebhookLogs::ReceivedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_webhook_logs_tenant_id")
                            .from(WebhookLogs::Table, WebhookLogs::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_webhook_logs_tenant_received")
                    .table(WebhookLogs::Table)
                    .col(WebhookLogs::TenantId)
                    .col(WebhookLogs::ReceivedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WebhookLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum WebhookLogs {
    Table,
    Id,
    TenantId,
    WebhookType,
    Payload,
    Processed,
    ErrorMessage,
    ReceivedAt,
}
