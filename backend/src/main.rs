//! Team Management System - HTTP server

use std::sync::Arc;

use tms::services::TaskQueue;
use tms::{config::Config, create_app, db, telemetry, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    telemetry::init_tracing(telemetry::json_logs_requested());
    let config = Config::load()?;

    tracing::info!("Starting Team Management Server");
    tracing::info!("Environment: {}", config.environment);

    let db_pool = db::connect(&config.database).await?;

    let queue = TaskQueue::new(&config.redis.url, config.worker.queue_name.clone())?;
    if let Err(e) = queue.ping().await {
        // Requests still succeed; email jobs fail to queue until Redis is reachable
        tracing::warn!("Task broker unavailable at startup: {}", e);
    }

    // Create application state
    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        queue,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = config.bind_address();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(tms::shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
