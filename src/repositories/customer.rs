//! # Customer Repository
//!
//! Idempotent customer persistence keyed by `(tenant_id,
//! external_customer_id)`. The create event replaces full state; the update
//! event changes only the fields present in the payload.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::error::{RepositoryError, is_unique_violation};
use crate::events::{CustomerPayload, parse_timestamp};
use crate::models::customer::{
    ActiveModel as CustomerActiveModel, Column, Entity as Customer, Model as CustomerModel,
};

/// Repository for Customer database operations
pub struct CustomerRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CustomerRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_external_id(
        &self,
        tenant_id: Uuid,
        external_customer_id: &str,
    ) -> Result<Option<CustomerModel>, RepositoryError> {
        let customer = Customer::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::ExternalCustomerId.eq(external_customer_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(customer)
    }

    /// Full-state upsert for the customer-create event. A replay overwrites
    /// every tracked field; absent payload fields zero-default.
    pub async fn upsert_from_create(
        &self,
        tenant_id: Uuid,
        payload: &CustomerPayload,
    ) -> Result<CustomerModel, RepositoryError> {
        match self.write_full_state(tenant_id, payload).await {
            // Lost an insert race against a concurrent delivery of the same
            // customer; the row exists now, so a second pass updates it.
            Err(RepositoryError::Database(err)) if is_unique_violation(&err) => {
                self.write_full_state(tenant_id, payload).await
            }
            other => other,
        }
    }

    async fn write_full_state(
        &self,
        tenant_id: Uuid,
        payload: &CustomerPayload,
    ) -> Result<CustomerModel, RepositoryError> {
        let now = Utc::now();
        let created_at = parse_timestamp(payload.created_at.as_deref())
            .map(Into::into)
            .unwrap_or_else(|| now.into());
        let updated_at = parse_timestamp(payload.updated_at.as_deref())
            .map(Into::into)
            .unwrap_or_else(|| now.into());

        let existing = self.find_by_external_id(tenant_id, &payload.id).await?;
        let is_new = existing.is_none();

        let mut active = match existing {
            Some(model) => model.into_active_model(),
            None => CustomerActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(tenant_id),
                external_customer_id: Set(payload.id.clone()),
                created_at: Set(created_at),
                ..Default::default()
            },
        };

        active.email = Set(payload.email.clone());
        active.first_name = Set(payload.first_name.clone());
        active.last_name = Set(payload.last_name.clone());
        active.phone = Set(payload.phone.clone());
        active.total_spent_cents = Set(payload.total_spent.unwrap_or(0));
        active.orders_count = Set(payload.orders_count.unwrap_or(0));
        active.accepts_marketing = Set(payload.accepts_marketing.unwrap_or(false));
        active.state = Set(payload.state.clone());
        active.tags = Set(payload.tags.as_ref().and_then(|t| t.to_column()));
        active.updated_at = Set(updated_at);

        let result = if is_new {
            active.insert(self.db).await
        } else {
            active.update(self.db).await
        }
        .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Partial update for the customer-update event. Fields absent from the
    /// payload keep their stored values. A miss is not an error: the update
    /// simply has nothing to apply.
    pub async fn apply_update(
        &self,
        tenant_id: Uuid,
        payload: &CustomerPayload,
    ) -> Result<Option<CustomerModel>, RepositoryError> {
        let Some(existing) = self.find_by_external_id(tenant_id, &payload.id).await? else {
            return Ok(None);
        };

        let mut active = existing.into_active_model();

        if payload.email.is_some() {
            active.email = Set(payload.email.clone());
        }
        if payload.first_name.is_some() {
            active.first_name = Set(payload.first_name.clone());
        }
        if payload.last_name.is_some() {
            active.last_name = Set(payload.last_name.clone());
        }
        if payload.phone.is_some() {
            active.phone = Set(payload.phone.clone());
        }
        if let Some(total_spent) = payload.total_spent {
            active.total_spent_cents = Set(total_spent);
        }
        if let Some(orders_count) = payload.orders_count {
            active.orders_count = Set(orders_count);
        }
        if let Some(accepts_marketing) = payload.accepts_marketing {
            active.accepts_marketing = Set(accepts_marketing);
        }
        if payload.state.is_some() {
            active.state = Set(payload.state.clone());
        }
        if let Some(tags) = payload.tags.as_ref() {
            active.tags = Set(tags.to_column());
        }

        let updated_at = parse_timestamp(payload.updated_at.as_deref())
            .map(Into::into)
            .unwrap_or_else(|| Utc::now().into());
        active.updated_at = Set(updated_at);

        let result = active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(Some(result))
    }
}
