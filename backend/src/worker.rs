//! Email task worker
//!
//! Pops email jobs from the Redis queue and delivers them through the mailer.
//! Failed jobs are pushed back with a linear backoff until `max_retries`
//! attempts have been made, then moved to the dead-letter list.

use std::time::Duration;

use tokio::sync::watch;

use crate::config::WorkerConfig;
use crate::error::AppResult;
use crate::services::{Mailer, TaskQueue};
use shared::models::EmailJob;

/// Pause after the broker could not be reached
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// What to do with a job whose delivery just failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Push the job back after waiting `delay`
    Retry { delay: Duration },
    /// Give up and keep the job on the dead-letter list
    DeadLetter,
}

/// Decide the fate of a job that failed on attempt number `attempts + 1`
pub fn retry_decision(attempts: u32, config: &WorkerConfig) -> RetryDecision {
    let next = attempts.saturating_add(1);
    if next < config.max_retries {
        RetryDecision::Retry {
            delay: Duration::from_secs(config.retry_backoff_secs.saturating_mul(u64::from(next))),
        }
    } else {
        RetryDecision::DeadLetter
    }
}

/// Delivers the email described by a job
#[axum::async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, job: &EmailJob) -> AppResult<()>;
}

#[axum::async_trait]
impl EmailSender for Mailer {
    async fn send(&self, job: &EmailJob) -> AppResult<()> {
        self.send_email(
            &job.subject,
            &job.message,
            job.from_email.as_deref(),
            &job.recipient_list,
        )
        .await
    }
}

/// Single-consumer worker loop
pub struct Worker<M = Mailer> {
    queue: TaskQueue,
    sender: M,
    config: WorkerConfig,
}

impl<M: EmailSender> Worker<M> {
    pub fn new(queue: TaskQueue, sender: M, config: WorkerConfig) -> Self {
        Self {
            queue,
            sender,
            config,
        }
    }

    /// Consume jobs until `shutdown` turns true. The flag is checked between
    /// polls, so a `BRPOP` in flight always completes and its job is processed.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let poll_timeout = Duration::from_secs(self.config.poll_timeout_secs);

        tracing::info!(
            queue = self.queue.queue_name(),
            max_retries = self.config.max_retries,
            "Worker started"
        );

        while !*shutdown.borrow() {
            match self.queue.dequeue(poll_timeout).await {
                Ok(Some(job)) => self.process(job).await,
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("Could not read from the task queue: {}", e);
                    tokio::select! {
                        changed = shutdown.changed() => {
                            // Sender gone: nobody is left to ask for a stop
                            if changed.is_err() {
                                break;
                            }
                        }
                        _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                    }
                }
            }
        }

        tracing::info!("Worker stopped");
    }

    /// Deliver one job and settle its outcome
    pub async fn process(&self, job: EmailJob) {
        tracing::debug!(job_id = %job.id, attempts = job.attempts, "Processing email job");

        let result = self.sender.send(&job).await;
        self.settle(job, result).await;
    }

    /// Requeue or dead-letter a job according to its delivery result
    pub async fn settle(&self, job: EmailJob, result: AppResult<()>) {
        let error = match result {
            Ok(()) => {
                tracing::info!(job_id = %job.id, "Email job delivered");
                return;
            }
            Err(e) => e,
        };

        match retry_decision(job.attempts, &self.config) {
            RetryDecision::Retry { delay } => {
                tracing::warn!(
                    job_id = %job.id,
                    attempts = job.attempts + 1,
                    delay_secs = delay.as_secs(),
                    "Email delivery failed, retrying: {}",
                    error
                );
                tokio::time::sleep(delay).await;
                if let Err(e) = self.queue.enqueue(&job.next_attempt()).await {
                    tracing::error!(job_id = %job.id, "Could not requeue email job: {}", e);
                }
            }
            RetryDecision::DeadLetter => {
                tracing::error!(
                    job_id = %job.id,
                    attempts = job.attempts + 1,
                    "Email delivery failed, giving up: {}",
                    error
                );
                if let Err(e) = self.queue.dead_letter(&job).await {
                    tracing::error!(job_id = %job.id, "Could not dead-letter email job: {}", e);
                }
            }
        }
    }
}
