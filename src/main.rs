//! # Shopstream Main Entry Point
//!
//! Loads configuration, initializes tracing and the database pool, applies
//! pending migrations, and starts the ingestion server.

use migration::{Migrator, MigratorTrait};
use shopstream::{config::ConfigLoader, db, server::run_server, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config);

    tracing::info!(profile = %config.profile, "configuration loaded");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "effective configuration");
    }

    let pool = db::init_pool(&config).await?;
    Migrator::up(&pool, None).await?;

    run_server(config, pool).await
}
