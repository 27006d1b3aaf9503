//! Database setup and initialization

use anyhow::Result;
use dropsend_core::Config;
use sqlx::SqlitePool;
use std::time::Duration;

/// Open the pool and apply the embedded migrations.
pub async fn setup_database(config: &Config) -> Result<SqlitePool> {
    tracing::info!("Connecting to database...");
    let pool = dropsend_db::connect(
        config.database_url(),
        config.db_max_connections(),
        Duration::from_secs(config.db_timeout_seconds()),
    )
    .await?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected and migrations applied"
    );

    Ok(pool)
}
