//! # Shopstream Ingestion Library
//!
//! Core functionality for the Shopstream analytics ingestion service:
//! webhook verification, tenant resolution, reference reconciliation, and
//! idempotent upserts into the relational store.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod reconcile;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub mod webhook_verification;
pub use migration;
