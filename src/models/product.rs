//! Product entity model
//!
//! Products are keyed by `(tenant_id, external_product_id)`. Price fields
//! come from the first variant of the source payload.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Product entity scoped to a tenant
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Owning tenant
    pub tenant_id: Uuid,

    /// Product id in the source platform
    pub external_product_id: String,

    pub title: Option<String>,
    pub handle: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,

    /// First-variant price in cents
    pub price_cents: i64,

    /// First-variant compare-at price in cents
    pub compare_at_price_cents: i64,

    /// Inventory summed across variants
    pub inventory_quantity: i32,

    pub status: Option<String>,

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
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
