//! Customer entity model
//!
//! Customers are keyed by `(tenant_id, external_customer_id)` so replayed
//! webhooks land on the same row.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Customer entity scoped to a tenant
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the customer (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Owning tenant
    pub tenant_id: Uuid,

    /// Customer id in the source platform
    pub external_customer_id: String,

    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,

    /// Lifetime spend in cents, as reported by the source platform
    pub total_spent_cents: i64,

    /// Order count as reported by the source platform
    pub orders_count: i32,

    pub accepts_marketing: bool,
    pub state: Option<String>,

    /// Comma-separated tag list
    pub tags: Option<String>,

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
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
