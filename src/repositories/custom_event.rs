//! # Custom Event Repository
//!
//! Append-only behavioral events (abandoned carts, started checkouts).

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::custom_event::{
    ActiveModel as CustomEventActiveModel, Column, Entity as CustomEvent,
    Model as CustomEventModel,
};

/// Repository for behavioral event records
pub struct CustomEventRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CustomEventRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends one behavioral event.
    pub async fn record(
        &self,
        tenant_id: Uuid,
        customer_id: Option<Uuid>,
        event_type: &str,
        event_data: JsonValue,
        occurred_at: Option<DateTime<FixedOffset>>,
    ) -> Result<CustomEventModel, RepositoryError> {
        let now = Utc::now();
        let event = CustomEventActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            customer_id: Set(customer_id),
            event_type: Set(event_type.to_string()),
            event_data: Set(event_data),
            occurred_at: Set(occurred_at.map(Into::into).unwrap_or_else(|| now.into())),
            created_at: Set(now.into()),
        };

        let result = event
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Events of one type for a tenant, newest first.
    pub async fn list_by_type(
        &self,
        tenant_id: Uuid,
        event_type: &str,
    ) -> Result<Vec<CustomEventModel>, RepositoryError> {
        let events = CustomEvent::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::EventType.eq(event_type))
            .order_by_desc(Column::OccurredAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(events)
    }
}
