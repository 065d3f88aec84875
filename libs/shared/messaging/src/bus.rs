use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Queue operation failed: {0}")]
    QueueError(String),

    #[error("Redis connection error: {0}")]
    RedisError(#[from] redis::RedisError),
}

/// At-least-once message transport between cells.
///
/// The transport makes no dedup or ordering promises beyond per-queue FIFO;
/// a message may be delivered more than once and consumers must be
/// idempotent.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, queue: &str, payload: &str) -> Result<(), MessagingError>;

    /// Pops the oldest message from `queue`, waiting up to `wait` for one to
    /// arrive. `Ok(None)` means the wait elapsed with the queue empty.
    async fn pop(&self, queue: &str, wait: Duration) -> Result<Option<String>, MessagingError>;
}

pub struct RedisEventBus {
    pool: Pool,
}

impl RedisEventBus {
    pub async fn new(redis_url: &str) -> Result<Self, MessagingError> {
        let cfg = Config::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| MessagingError::QueueError(format!("Failed to create Redis pool: {}", e)))?;

        // Test connection
        let mut conn = pool
            .get()
            .await
            .map_err(|e| MessagingError::QueueError(format!("Failed to connect to Redis: {}", e)))?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Redis event bus initialized successfully");

        Ok(Self { pool })
    }

    async fn get_connection(&self) -> Result<deadpool_redis::Connection, MessagingError> {
        self.pool
            .get()
            .await
            .map_err(|e| MessagingError::QueueError(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl EventBus for RedisEventBus {
    async fn publish(&self, queue: &str, payload: &str) -> Result<(), MessagingError> {
        let mut conn = self.get_connection().await?;
        let _: () = conn.lpush(queue, payload).await?;
        debug!("Published message to queue {}", queue);
        Ok(())
    }

    async fn pop(&self, queue: &str, wait: Duration) -> Result<Option<String>, MessagingError> {
        let mut conn = self.get_connection().await?;
        let popped: Option<(String, String)> = conn.brpop(queue, wait.as_secs_f64()).await?;
        Ok(popped.map(|(_, payload)| payload))
    }
}

/// In-process bus with the same at-least-once contract, for tests and
/// broker-less single-node runs.
#[derive(Default)]
pub struct InMemoryEventBus {
    queues: Mutex<HashMap<String, VecDeque<String>>>,
    notify: Arc<Notify>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, queue: &str) -> usize {
        let queues = self.queues.lock().await;
        queues.get(queue).map(VecDeque::len).unwrap_or(0)
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, queue: &str, payload: &str) -> Result<(), MessagingError> {
        let mut queues = self.queues.lock().await;
        queues
            .entry(queue.to_string())
            .or_default()
            .push_back(payload.to_string());
        self.notify.notify_waiters();
        Ok(())
    }

    async fn pop(&self, queue: &str, wait: Duration) -> Result<Option<String>, MessagingError> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            // Arm the wakeup before checking the queue; `Notified` only
            // registers once polled, so without `enable` a publish landing
            // between the check and the await would not wake us.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut queues = self.queues.lock().await;
                if let Some(payload) = queues.get_mut(queue).and_then(VecDeque::pop_front) {
                    return Ok(Some(payload));
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }
}
