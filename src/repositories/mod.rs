//! # Repository Layer
//!
//! Repository implementations encapsulating SeaORM operations for the
//! ingestion store, providing tenant-aware data access.

pub mod custom_event;
pub mod customer;
pub mod order;
pub mod product;
pub mod tenant;
pub mod webhook_log;

pub use custom_event::CustomEventRepository;
pub use customer::CustomerRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use tenant::TenantRepository;
pub use webhook_log::WebhookLogRepository;
