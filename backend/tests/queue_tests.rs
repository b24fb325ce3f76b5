//! Email queue and worker tests against a live Redis
//!
//! Skipped unless `TMS_TEST_REDIS_URL` points at a Redis server, e.g.
//! `TMS_TEST_REDIS_URL=redis://127.0.0.1:6379 cargo test --test queue_tests`.
//! Every test works on its own uniquely named list.

use std::time::Duration;

use shared::models::EmailJob;
use tms::config::WorkerConfig;
use tms::error::{AppError, AppResult};
use tms::services::TaskQueue;
use tms::worker::{EmailSender, Worker};
use uuid::Uuid;

fn redis_url() -> Option<String> {
    std::env::var("TMS_TEST_REDIS_URL").ok().filter(|u| !u.is_empty())
}

fn test_queue(url: &str) -> TaskQueue {
    TaskQueue::new(url, format!("tms:test:{}", Uuid::new_v4())).unwrap()
}

fn worker_config(queue: &TaskQueue, max_retries: u32) -> WorkerConfig {
    WorkerConfig {
        queue_name: queue.queue_name().to_string(),
        max_retries,
        poll_timeout_secs: 1,
        retry_backoff_secs: 0,
    }
}

async fn list_len(url: &str, key: &str) -> u64 {
    let client = redis::Client::open(url).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    redis::cmd("LLEN").arg(key).query_async(&mut conn).await.unwrap()
}

async fn cleanup(url: &str, queue: &TaskQueue) {
    let client = redis::Client::open(url).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let _: i64 = redis::cmd("DEL")
        .arg(queue.queue_name())
        .arg(queue.dead_letter_name())
        .query_async(&mut conn)
        .await
        .unwrap();
}

/// Sender whose SMTP server is always down
struct FailingSender;

#[axum::async_trait]
impl EmailSender for FailingSender {
    async fn send(&self, _job: &EmailJob) -> AppResult<()> {
        Err(AppError::Email("connection refused".to_string()))
    }
}

struct AcceptingSender;

#[axum::async_trait]
impl EmailSender for AcceptingSender {
    async fn send(&self, _job: &EmailJob) -> AppResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_enqueued_job_is_dequeued_intact() {
    let Some(url) = redis_url() else { return };
    let queue = test_queue(&url);

    let job = EmailJob::welcome("alice", "alice@example.com");
    queue.enqueue(&job).await.unwrap();
    assert_eq!(queue.pending_count().await.unwrap(), 1);

    let popped = queue.dequeue(Duration::from_secs(1)).await.unwrap();
    assert_eq!(popped, Some(job));
    assert_eq!(queue.pending_count().await.unwrap(), 0);

    cleanup(&url, &queue).await;
}

#[tokio::test]
async fn test_jobs_come_out_in_push_order() {
    let Some(url) = redis_url() else { return };
    let queue = test_queue(&url);

    let first = EmailJob::welcome("alice", "alice@example.com");
    let second = EmailJob::welcome("bob", "bob@example.com");
    queue.enqueue(&first).await.unwrap();
    queue.enqueue(&second).await.unwrap();

    let popped = queue.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
    assert_eq!(popped.id, first.id);
    let popped = queue.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
    assert_eq!(popped.id, second.id);

    cleanup(&url, &queue).await;
}

#[tokio::test]
async fn test_empty_queue_times_out() {
    let Some(url) = redis_url() else { return };
    let queue = test_queue(&url);

    assert_eq!(queue.dequeue(Duration::from_secs(1)).await.unwrap(), None);

    cleanup(&url, &queue).await;
}

#[tokio::test]
async fn test_malformed_payload_is_dead_lettered() {
    let Some(url) = redis_url() else { return };
    let queue = test_queue(&url);

    let client = redis::Client::open(url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let _: i64 = redis::cmd("LPUSH")
        .arg(queue.queue_name())
        .arg("{not json")
        .query_async(&mut conn)
        .await
        .unwrap();

    assert_eq!(queue.dequeue(Duration::from_secs(1)).await.unwrap(), None);
    assert_eq!(list_len(&url, &queue.dead_letter_name()).await, 1);
    assert_eq!(queue.pending_count().await.unwrap(), 0);

    cleanup(&url, &queue).await;
}

#[tokio::test]
async fn test_failed_delivery_is_retried_then_dead_lettered() {
    let Some(url) = redis_url() else { return };
    let queue = test_queue(&url);
    let worker = Worker::new(queue.clone(), FailingSender, worker_config(&queue, 2));

    worker.process(EmailJob::welcome("alice", "alice@example.com")).await;

    // First failure goes back on the queue with the attempt counted
    let retry = queue.dequeue(Duration::from_secs(1)).await.unwrap().unwrap();
    assert_eq!(retry.attempts, 1);
    assert_eq!(list_len(&url, &queue.dead_letter_name()).await, 0);

    // Second failure reaches max_retries
    worker.process(retry).await;
    assert_eq!(queue.pending_count().await.unwrap(), 0);
    assert_eq!(list_len(&url, &queue.dead_letter_name()).await, 1);

    cleanup(&url, &queue).await;
}

#[tokio::test]
async fn test_delivered_job_leaves_no_trace() {
    let Some(url) = redis_url() else { return };
    let queue = test_queue(&url);
    let worker = Worker::new(queue.clone(), AcceptingSender, worker_config(&queue, 3));

    worker.process(EmailJob::welcome("alice", "alice@example.com")).await;

    assert_eq!(queue.pending_count().await.unwrap(), 0);
    assert_eq!(list_len(&url, &queue.dead_letter_name()).await, 0);

    cleanup(&url, &queue).await;
}

#[tokio::test]
async fn test_worker_drains_queue_until_stopped() {
    let Some(url) = redis_url() else { return };
    let queue = test_queue(&url);
    let worker = Worker::new(queue.clone(), AcceptingSender, worker_config(&queue, 3));

    for name in ["alice", "bob", "carol"] {
        queue
            .enqueue(&EmailJob::welcome(name, &format!("{}@example.com", name)))
            .await
            .unwrap();
    }

    let (tx, rx) = tokio::sync::watch::channel(false);
    let stop = async {
        while queue.pending_count().await.unwrap() > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tx.send(true).unwrap();
    };

    let (result, ()) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(10), worker.run(rx)),
        stop
    );
    assert!(result.is_ok());
    assert_eq!(list_len(&url, &queue.dead_letter_name()).await, 0);

    cleanup(&url, &queue).await;
}
