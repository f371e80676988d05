//! # Data Models
//!
//! SeaORM entity models for the Shopstream ingestion store.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod custom_event;
pub mod customer;
pub mod order;
pub mod order_line_item;
pub mod product;
pub mod tenant;
pub mod webhook_log;

pub use custom_event::Entity as CustomEvent;
pub use customer::Entity as Customer;
pub use order::Entity as Order;
pub use order_line_item::Entity as OrderLineItem;
pub use product::Entity as Product;
pub use tenant::Entity as Tenant;
pub use webhook_log::Entity as WebhookLog;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "shopstream".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
