//! Webhook log entity model
//!
//! An audit record written for every delivery attempt, successful or not.
//! The tenant link is null when the delivery could not be attributed.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;

/// One received webhook delivery
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "webhook_logs")]
pub struct Model {
    /// Unique identifier for the log entry (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Tenant the delivery was attributed to, when known
    pub tenant_id: Option<Uuid>,

    /// Webhook type, e.g. order_create or customer_update
    pub webhook_type: String,

    /// Raw request payload as received
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: JsonValue,

    /// Whether processing completed successfully
    pub processed: bool,

    /// Failure reason when processing did not complete
    pub error_message: Option<String>,

    /// When the delivery arrived
    pub received_at: DateTimeWithTimeZone,
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
