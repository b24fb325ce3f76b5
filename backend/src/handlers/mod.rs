//! HTTP request handlers

pub mod auth;
pub mod health;
pub mod task;
pub mod team;

pub use auth::*;
pub use health::*;
pub use task::*;
pub use team::*;

use std::time::Duration;

use crate::services::TaskQueue;
use shared::models::EmailJob;

/// Longest a request waits on the broker before dropping its email
const ENQUEUE_TIMEOUT: Duration = Duration::from_secs(2);

/// Hand an email to the worker. Queue failures are logged and do not fail the request.
pub(crate) async fn queue_email(queue: &TaskQueue, job: EmailJob) {
    if job.recipient_list.iter().all(|r| r.trim().is_empty()) {
        tracing::debug!(subject = %job.subject, "Skipping email without recipients");
        return;
    }

    match tokio::time::timeout(ENQUEUE_TIMEOUT, queue.enqueue(&job)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(job_id = %job.id, "Could not queue email: {}", e),
        Err(_) => tracing::warn!(
            job_id = %job.id,
            "Timed out queueing email after {}s",
            ENQUEUE_TIMEOUT.as_secs()
        ),
    }
}
