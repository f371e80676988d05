//! Custom event entity model
//!
//! Behavioral events (cart abandoned, checkout started) stored as raw JSON
//! rather than being reconciled into entity tables.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;

/// A behavioral event attached to a tenant and optionally a customer
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "custom_events")]
pub struct Model {
    /// Unique identifier for the event (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Owning tenant
    pub tenant_id: Uuid,

    /// Resolved local customer, if one was known at ingest time
    pub customer_id: Option<Uuid>,

    /// Event kind, e.g. cart_abandoned or checkout_started
    pub event_type: String,

    /// Raw event payload
    #[sea_orm(column_type = "JsonBinary")]
    pub event_data: JsonValue,

    /// When the event happened in the source platform
    pub occurred_at: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,
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

impl ActiveModelBehavior for ActiveModel {}
