//! Database pool creation and schema migrations

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// Create the PostgreSQL connection pool
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let options = config.connect_options()?;

    tracing::info!("Connecting to database at {}:{}", config.host, config.port);
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    tracing::info!("Database connection established");
    Ok(pool)
}

/// Bring the schema up to date
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrations completed");
    Ok(())
}
