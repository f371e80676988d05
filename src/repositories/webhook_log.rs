//! # Webhook Log Repository
//!
//! Append-only audit trail. Every inbound delivery produces a row whether
//! or not processing succeeded; callers swallow write failures so the audit
//! path never alters the HTTP response.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::webhook_log::{
    ActiveModel as WebhookLogActiveModel, Column, Entity as WebhookLog, Model as WebhookLogModel,
};

/// Repository for webhook delivery audit records
pub struct WebhookLogRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> WebhookLogRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends one delivery record. `error_message` is None on success.
    pub async fn log(
        &self,
        tenant_id: Option<Uuid>,
        webhook_type: &str,
        payload: JsonValue,
        error_message: Option<String>,
    ) -> Result<WebhookLogModel, RepositoryError> {
        let entry = WebhookLogActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            webhook_type: Set(webhook_type.to_string()),
            payload: Set(payload),
            processed: Set(error_message.is_none()),
            error_message: Set(error_message),
            received_at: Set(Utc::now().into()),
        };

        let result = entry
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Recent deliveries for a tenant, newest first.
    pub async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<WebhookLogModel>, RepositoryError> {
        let logs = WebhookLog::find()
            .filter(Column::TenantId.eq(tenant_id))
            .order_by_desc(Column::ReceivedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(logs)
    }
}
