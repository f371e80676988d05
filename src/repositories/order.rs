//! # Order Repository
//!
//! Idempotent order persistence keyed by `(tenant_id, external_order_id)`.
//! The order row and its line items are written in one transaction; a replay
//! replaces the line item set wholesale rather than merging.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::{RepositoryError, is_unique_violation};
use crate::events::{OrderPayload, parse_timestamp};
use crate::models::order::{
    ActiveModel as OrderActiveModel, Column, Entity as Order, Model as OrderModel,
};
use crate::models::order_line_item::{
    ActiveModel as LineItemActiveModel, Column as LineItemColumn, Entity as OrderLineItem,
    Model as LineItemModel,
};

/// A line item with its references already resolved, ready to persist.
#[derive(Debug, Clone)]
pub struct ResolvedLineItem {
    pub product_id: Option<Uuid>,
    pub external_variant_id: Option<String>,
    pub title: Option<String>,
    pub quantity: i32,
    pub price_cents: i64,
    pub total_discount_cents: i64,
}

/// Repository for Order database operations
pub struct OrderRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OrderRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_external_id(
        &self,
        tenant_id: Uuid,
        external_order_id: &str,
    ) -> Result<Option<OrderModel>, RepositoryError> {
        let order = Order::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::ExternalOrderId.eq(external_order_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(order)
    }

    pub async fn line_items(&self, order_id: Uuid) -> Result<Vec<LineItemModel>, RepositoryError> {
        let items = OrderLineItem::find()
            .filter(LineItemColumn::OrderId.eq(order_id))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(items)
    }

    /// Upserts the order row and replaces its line items atomically. A
    /// rollback leaves the previous delivery's state intact.
    pub async fn upsert_with_line_items(
        &self,
        tenant_id: Uuid,
        payload: &OrderPayload,
        customer_id: Option<Uuid>,
        line_items: Vec<ResolvedLineItem>,
    ) -> Result<OrderModel, RepositoryError> {
        match self
            .write_order(tenant_id, payload, customer_id, line_items.clone())
            .await
        {
            // Lost an insert race against a concurrent delivery of the same
            // order; the row exists now, so a second pass updates it.
            Err(RepositoryError::Database(err)) if is_unique_violation(&err) => {
                self.write_order(tenant_id, payload, customer_id, line_items)
                    .await
            }
            other => other,
        }
    }

    async fn write_order(
        &self,
        tenant_id: Uuid,
        payload: &OrderPayload,
        customer_id: Option<Uuid>,
        line_items: Vec<ResolvedLineItem>,
    ) -> Result<OrderModel, RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let now = Utc::now();
        let created_at = parse_timestamp(payload.created_at.as_deref())
            .map(Into::into)
            .unwrap_or_else(|| now.into());
        let updated_at = parse_timestamp(payload.updated_at.as_deref())
            .map(Into::into)
            .unwrap_or_else(|| now.into());
        let placed_at = parse_timestamp(payload.created_at.as_deref()).map(Into::into);

        let existing = Order::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::ExternalOrderId.eq(payload.id.as_str()))
            .one(&txn)
            .await
            .map_err(RepositoryError::database_error)?;
        let is_new = existing.is_none();

        let mut active = match existing {
            Some(model) => model.into_active_model(),
            None => OrderActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(tenant_id),
                external_order_id: Set(payload.id.clone()),
                created_at: Set(created_at),
                ..Default::default()
            },
        };

        active.customer_id = Set(customer_id);
        active.order_number = Set(payload.order_number_or_name());
        active.email = Set(payload.email.clone());
        active.total_price_cents = Set(payload.total_price);
        active.subtotal_price_cents = Set(payload.subtotal_price);
        active.total_tax_cents = Set(payload.total_tax);
        active.currency = Set(payload
            .currency
            .clone()
            .unwrap_or_else(|| "USD".to_string()));
        active.financial_status = Set(payload.financial_status.clone());
        active.fulfillment_status = Set(payload.fulfillment_status.clone());
        active.tags = Set(payload.tags.to_column());
        active.placed_at = Set(placed_at);
        active.updated_at = Set(updated_at);

        let order = if is_new {
            active.insert(&txn).await
        } else {
            active.update(&txn).await
        }
        .map_err(RepositoryError::database_error)?;

        // Replace, not merge: the delivery's line item set is authoritative.
        OrderLineItem::delete_many()
            .filter(LineItemColumn::OrderId.eq(order.id))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        for item in line_items {
            insert_line_item(&txn, order.id, item).await?;
        }

        txn.commit().await.map_err(RepositoryError::database_error)?;

        Ok(order)
    }
}

async fn insert_line_item<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    item: ResolvedLineItem,
) -> Result<(), RepositoryError> {
    let active = LineItemActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        product_id: Set(item.product_id),
        external_variant_id: Set(item.external_variant_id),
        title: Set(item.title),
        quantity: Set(item.quantity),
        price_cents: Set(item.price_cents),
        total_discount_cents: Set(item.total_discount_cents),
    };

    active
        .insert(conn)
        .await
        .map_err(RepositoryError::database_error)?;

    Ok(())
}
