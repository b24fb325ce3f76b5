//! Team Management System - email task worker
//!
//! Consumes email jobs queued by the HTTP server and delivers them through
//! the configured mail transport.

use clap::Parser;

use tms::config::Config;
use tms::services::{Mailer, TaskQueue};
use tms::worker::Worker;
use tms::telemetry;

/// Worker CLI arguments
#[derive(Parser, Debug)]
#[command(name = "tms-worker")]
#[command(about = "Email task worker for the Team Management System")]
struct Args {
    /// Redis list to consume (overrides worker.queue_name)
    #[arg(long)]
    queue: Option<String>,

    /// Delivery attempts before a job is dead-lettered (overrides worker.max_retries)
    #[arg(long)]
    max_retries: Option<u32>,

    /// Emit JSON log lines
    #[arg(long, env = "TMS__LOGGING__JSON")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    telemetry::init_tracing(args.json_logs);

    let mut config = Config::load()?;
    if let Some(queue) = args.queue {
        config.worker.queue_name = queue;
    }
    if let Some(max_retries) = args.max_retries {
        anyhow::ensure!(max_retries >= 1, "--max-retries must be at least 1");
        config.worker.max_retries = max_retries;
    }

    tracing::info!("Starting Team Management worker");
    tracing::info!("Environment: {}", config.environment);

    let queue = TaskQueue::new(&config.redis.url, config.worker.queue_name.clone())?;
    let mailer = Mailer::new(&config.email)?;

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tms::shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    Worker::new(queue, mailer, config.worker.clone())
        .run(stop_rx)
        .await;

    Ok(())
}
