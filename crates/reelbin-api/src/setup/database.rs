//! Database pool setup and migrations

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use reelbin_core::Config;

pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    reelbin_db::MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Database connected and migrated"
    );

    Ok(pool)
}
