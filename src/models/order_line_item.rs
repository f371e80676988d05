//! Order line item entity model
//!
//! Line items belong to exactly one order and are replaced wholesale when
//! an order webhook is replayed.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;

/// A single line of an order
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "order_line_items")]
pub struct Model {
    /// Unique identifier for the line item (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Owning order
    pub order_id: Uuid,

    /// Resolved local product, if one was known at ingest time
    pub product_id: Option<Uuid>,

    /// Variant id in the source platform
    pub external_variant_id: Option<String>,

    pub title: Option<String>,
    pub quantity: i32,
    pub price_cents: i64,
    pub total_discount_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
