//! Entity reconciliation.
//!
//! Translates external references carried on payloads (customer on an
//! order, product on a line item) into local row ids, scoped to the tenant.
//! Lookups are read-only: an unknown reference resolves to `None` and the
//! event proceeds with a null link. No placeholder rows are created, and a
//! later arrival of the referenced entity never backfills earlier nulls.

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::events::{LineItemPayload, OrderPayload};
use crate::repositories::order::ResolvedLineItem;
use crate::repositories::{CustomerRepository, ProductRepository};

pub struct Reconciler<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> Reconciler<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves an external customer id to a local customer row id.
    pub async fn resolve_customer(
        &self,
        tenant_id: Uuid,
        external_customer_id: Option<&str>,
    ) -> Result<Option<Uuid>, RepositoryError> {
        let Some(external_id) = external_customer_id else {
            return Ok(None);
        };

        let customer = CustomerRepository::new(self.db)
            .find_by_external_id(tenant_id, external_id)
            .await?;

        Ok(customer.map(|c| c.id))
    }

    /// Resolves an external product id to a local product row id.
    pub async fn resolve_product(
        &self,
        tenant_id: Uuid,
        external_product_id: Option<&str>,
    ) -> Result<Option<Uuid>, RepositoryError> {
        let Some(external_id) = external_product_id else {
            return Ok(None);
        };

        let product = ProductRepository::new(self.db)
            .find_by_external_id(tenant_id, external_id)
            .await?;

        Ok(product.map(|p| p.id))
    }

    /// Resolves every line item of an order payload. Items referencing
    /// unknown products keep a null product link; the snapshot fields
    /// (title, price) still persist.
    pub async fn resolve_line_items(
        &self,
        tenant_id: Uuid,
        payload: &OrderPayload,
    ) -> Result<Vec<ResolvedLineItem>, RepositoryError> {
        let mut resolved = Vec::with_capacity(payload.line_items.len());
        for item in &payload.line_items {
            resolved.push(self.resolve_line_item(tenant_id, item).await?);
        }
        Ok(resolved)
    }

    async fn resolve_line_item(
        &self,
        tenant_id: Uuid,
        item: &LineItemPayload,
    ) -> Result<ResolvedLineItem, RepositoryError> {
        let product_id = self
            .resolve_product(tenant_id, item.product_id.as_deref())
            .await?;

        Ok(ResolvedLineItem {
            product_id,
            external_variant_id: item.variant_id.clone(),
            title: item.title.clone(),
            quantity: item.quantity,
            price_cents: item.price,
            total_discount_cents: item.total_discount,
        })
    }
}
