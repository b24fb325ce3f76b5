//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub cache: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_jobs: Option<u64>,
}

/// Root endpoint
pub async fn root() -> &'static str {
    "Team Management System API v1.0"
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check database connectivity
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected".to_string(),
        Err(_) => "disconnected".to_string(),
    };

    // Check broker connectivity
    let (cache, pending_jobs) = match state.queue.ping().await {
        Ok(()) => ("connected".to_string(), state.queue.pending_count().await.ok()),
        Err(_) => ("disconnected".to_string(), None),
    };

    let status = if database == "connected" && cache == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        cache,
        pending_jobs,
    })
}
