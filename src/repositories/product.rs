//! # Product Repository
//!
//! Idempotent product persistence keyed by `(tenant_id,
//! external_product_id)`. Price and inventory come from the payload's first
//! variant.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::error::{RepositoryError, is_unique_violation};
use crate::events::{ProductPayload, parse_timestamp};
use crate::models::product::{
    ActiveModel as ProductActiveModel, Column, Entity as Product, Model as ProductModel,
};

/// Repository for Product database operations
pub struct ProductRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ProductRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_external_id(
        &self,
        tenant_id: Uuid,
        external_product_id: &str,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let product = Product::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::ExternalProductId.eq(external_product_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(product)
    }

    /// Full-state upsert for the product-create event.
    pub async fn upsert_from_create(
        &self,
        tenant_id: Uuid,
        payload: &ProductPayload,
    ) -> Result<ProductModel, RepositoryError> {
        match self.write_full_state(tenant_id, payload).await {
            // Lost an insert race against a concurrent delivery of the same
            // product; the row exists now, so a second pass updates it.
            Err(RepositoryError::Database(err)) if is_unique_violation(&err) => {
                self.write_full_state(tenant_id, payload).await
            }
            other => other,
        }
    }

    async fn write_full_state(
        &self,
        tenant_id: Uuid,
        payload: &ProductPayload,
    ) -> Result<ProductModel, RepositoryError> {
        let now = Utc::now();
        let created_at = parse_timestamp(payload.created_at.as_deref())
            .map(Into::into)
            .unwrap_or_else(|| now.into());
        let updated_at = parse_timestamp(payload.updated_at.as_deref())
            .map(Into::into)
            .unwrap_or_else(|| now.into());

        let first_variant = payload.variants.first();
        let price_cents = first_variant.map(|v| v.price).unwrap_or(0);
        let compare_at_price_cents = first_variant.map(|v| v.compare_at_price).unwrap_or(0);
        let inventory_quantity = first_variant.map(|v| v.inventory_quantity).unwrap_or(0);

        let existing = self.find_by_external_id(tenant_id, &payload.id).await?;
        let is_new = existing.is_none();

        let mut active = match existing {
            Some(model) => model.into_active_model(),
            None => ProductActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(tenant_id),
                external_product_id: Set(payload.id.clone()),
                created_at: Set(created_at),
                ..Default::default()
            },
        };

        active.title = Set(payload.title.clone());
        active.handle = Set(payload.handle.clone());
        active.vendor = Set(payload.vendor.clone());
        active.product_type = Set(payload.product_type.clone());
        active.price_cents = Set(price_cents);
        active.compare_at_price_cents = Set(compare_at_price_cents);
        active.inventory_quantity = Set(inventory_quantity);
        active.status = Set(payload.status.clone());
        active.tags = Set(payload.tags.to_column());
        active.updated_at = Set(updated_at);

        let result = if is_new {
            active.insert(self.db).await
        } else {
            active.update(self.db).await
        }
        .map_err(RepositoryError::database_error)?;

        Ok(result)
    }
}
