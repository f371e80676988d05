//! Database pool setup and health checks.

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("failed to connect to database after {attempts} attempts: {source}")]
    ConnectionFailed { attempts: u32, source: DbErr },
    #[error("database health check failed: {0}")]
    HealthCheckFailed(#[from] DbErr),
}

const MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Creates the connection pool, retrying with exponential backoff.
pub async fn init_pool(config: &AppConfig) -> Result<DatabaseConnection, DatabaseError> {
    let mut options = ConnectOptions::new(config.database_url.clone());

    // A pooled in-memory SQLite database gives each connection its own
    // database, so clamp the pool to one connection there.
    let max_connections = if config.database_url.contains("sqlite::memory:") {
        1
    } else {
        config.db_max_connections
    };

    options
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_millis(config.db_acquire_timeout_ms))
        .sqlx_logging(false);

    let mut backoff = Duration::from_millis(250);
    let mut last_err = None;

    for attempt in 1..=MAX_CONNECT_ATTEMPTS {
        match Database::connect(options.clone()).await {
            Ok(conn) => {
                info!(attempt, "database pool initialized");
                return Ok(conn);
            }
            Err(err) => {
                warn!(attempt, error = %err, "database connection failed, retrying");
                last_err = Some(err);
                if attempt < MAX_CONNECT_ATTEMPTS {
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    Err(DatabaseError::ConnectionFailed {
        attempts: MAX_CONNECT_ATTEMPTS,
        source: last_err.expect("at least one attempt recorded"),
    })
}

/// Issues a trivial query to confirm the pool is usable.
pub async fn health_check(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "SELECT 1".to_string(),
    ))
    .await?;
    Ok(())
}
