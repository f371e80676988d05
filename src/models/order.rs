//! Order entity model
//!
//! Orders are keyed by `(tenant_id, external_order_id)`. The customer link
//! is resolved at ingest time and stays null when the customer is unknown.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Order entity scoped to a tenant
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Owning tenant
    pub tenant_id: Uuid,

    /// Order id in the source platform
    pub external_order_id: String,

    /// Resolved local customer, if one was known at ingest time
    pub customer_id: Option<Uuid>,

    pub order_number: Option<String>,
    pub email: Option<String>,

    pub total_price_cents: i64,
    pub subtotal_price_cents: i64,
    pub total_tax_cents: i64,
    pub currency: String,

    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,

    /// Comma-separated tag list
    pub tags: Option<String>,

    /// When the order was placed in the source platform
    pub placed_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id"
    )]
    Tenant,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(has_many = "super::order_line_item::Entity")]
    LineItems,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::order_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
