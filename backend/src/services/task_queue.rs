//! Redis-backed queue for background email jobs
//!
//! The web process pushes jobs with `LPUSH`; workers take them with `BRPOP`,
//! so each job is handed to exactly one worker. Jobs that cannot be parsed
//! or that exhaust their retries are moved to `{queue}:dead`.

use std::time::Duration;

use shared::models::EmailJob;

use crate::error::{AppError, AppResult};

/// Handle to the job queue
#[derive(Clone)]
pub struct TaskQueue {
    client: redis::Client,
    queue_name: String,
}

impl TaskQueue {
    /// Create a queue handle. No connection is made until the first command.
    pub fn new(redis_url: &str, queue_name: impl Into<String>) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Configuration(format!("Invalid Redis URL: {}", e)))?;

        Ok(Self {
            client,
            queue_name: queue_name.into(),
        })
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn dead_letter_name(&self) -> String {
        format!("{}:dead", self.queue_name)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(queue_error)
    }

    /// Check broker connectivity
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(queue_error)?;
        Ok(())
    }

    /// Push a job onto the queue
    pub async fn enqueue(&self, job: &EmailJob) -> AppResult<()> {
        let payload = job
            .to_payload()
            .map_err(|e| AppError::Internal(format!("Failed to serialize job: {}", e)))?;
        self.push(&self.queue_name, &payload).await?;

        tracing::debug!(job_id = %job.id, attempts = job.attempts, "Queued email job");
        Ok(())
    }

    /// Wait up to `timeout` for the next job
    pub async fn dequeue(&self, timeout: Duration) -> AppResult<Option<EmailJob>> {
        let mut conn = self.connection().await?;
        let popped = redis::cmd("BRPOP")
            .arg(&self.queue_name)
            .arg(timeout.as_secs().max(1))
            .query_async::<_, Option<(String, String)>>(&mut conn)
            .await
            .map_err(queue_error)?;

        let Some((_, payload)) = popped else {
            return Ok(None);
        };

        match EmailJob::from_payload(&payload) {
            Ok(job) => Ok(Some(job)),
            Err(e) => {
                tracing::error!("Discarding malformed job payload: {}", e);
                let dead = self.dead_letter_name();
                self.push(&dead, &payload).await?;
                Ok(None)
            }
        }
    }

    /// Move a job that will not be retried to the dead-letter list
    pub async fn dead_letter(&self, job: &EmailJob) -> AppResult<()> {
        let payload = job
            .to_payload()
            .map_err(|e| AppError::Internal(format!("Failed to serialize job: {}", e)))?;
        let dead = self.dead_letter_name();
        self.push(&dead, &payload).await
    }

    /// Number of jobs waiting in the queue
    pub async fn pending_count(&self) -> AppResult<u64> {
        let mut conn = self.connection().await?;
        redis::cmd("LLEN")
            .arg(&self.queue_name)
            .query_async::<_, u64>(&mut conn)
            .await
            .map_err(queue_error)
    }

    async fn push(&self, key: &str, payload: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("LPUSH")
            .arg(key)
            .arg(payload)
            .query_async::<_, i64>(&mut conn)
            .await
            .map_err(queue_error)?;
        Ok(())
    }
}

fn queue_error(e: redis::RedisError) -> AppError {
    AppError::Queue(e.to_string())
}
