//! # PostgreSQL Message Queue Client
//!
//! Thin wrapper around the pgmq-rs crate carrying structured errors and
//! tracing. Both pipeline queues (domain events in, learn jobs out/in)
//! run through this client on a shared connection pool.

use crate::constants::queues;
use crate::messaging::errors::{MessagingError, MessagingResult};
use crate::messaging::message::LearnJob;
use pgmq::{types::Message, PGMQueue};
use tracing::{debug, info};

/// Seam for components that only enqueue learn jobs.
///
/// The event listener depends on this trait rather than the concrete
/// client so its validation behavior can be tested without a database.
#[async_trait::async_trait]
pub trait LearnQueue: Send + Sync {
    /// Enqueue one learn job; returns the queue message id
    async fn enqueue_learn_job(&self, job: &LearnJob) -> MessagingResult<i64>;
}

/// pgmq-rs based message queue client
#[derive(Debug, Clone)]
pub struct PgmqClient {
    pgmq: PGMQueue,
}

impl PgmqClient {
    /// Create a new pgmq client using a connection string
    pub async fn new(database_url: &str) -> MessagingResult<Self> {
        let pgmq = PGMQueue::new(database_url.to_string()).await?;

        debug!("Connected to pgmq");
        Ok(Self { pgmq })
    }

    /// Create a new pgmq client using an existing connection pool
    pub async fn new_with_pool(pool: sqlx::PgPool) -> Self {
        let pgmq = PGMQueue::new_with_pool(pool).await;

        debug!("pgmq client created with shared pool");
        Self { pgmq }
    }

    /// Create queue if it doesn't exist
    pub async fn create_queue(&self, queue_name: &str) -> MessagingResult<()> {
        self.pgmq.create(queue_name).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "create", e.to_string())
        })?;

        debug!(queue = queue_name, "Queue ensured");
        Ok(())
    }

    /// Send a JSON-serializable message to a queue
    pub async fn send_json_message<T: serde::Serialize>(
        &self,
        queue_name: &str,
        message: &T,
    ) -> MessagingResult<i64> {
        let serialized = serde_json::to_value(message)?;
        let message_id = self.pgmq.send(queue_name, &serialized).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "send", e.to_string())
        })?;

        debug!(queue = queue_name, message_id = message_id, "Message sent");
        Ok(message_id)
    }

    /// Read a batch of messages from a queue as raw JSON values
    ///
    /// Reading as `serde_json::Value` lets callers handle per-message
    /// deserialization failures (archive the poison message) instead of
    /// failing the whole batch.
    pub async fn read_messages(
        &self,
        queue_name: &str,
        visibility_timeout: Option<i32>,
        limit: i32,
    ) -> MessagingResult<Vec<Message<serde_json::Value>>> {
        let messages = self
            .pgmq
            .read_batch(queue_name, visibility_timeout, limit)
            .await
            .map_err(|e| MessagingError::queue_operation(queue_name, "read_batch", e.to_string()))?
            .unwrap_or_default();

        debug!(
            queue = queue_name,
            count = messages.len(),
            "Read message batch"
        );
        Ok(messages)
    }

    /// Delete a message from a queue (acknowledge successful processing)
    pub async fn delete_message(&self, queue_name: &str, message_id: i64) -> MessagingResult<()> {
        self.pgmq.delete(queue_name, message_id).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "delete", e.to_string())
        })?;

        debug!(queue = queue_name, message_id = message_id, "Message deleted");
        Ok(())
    }

    /// Archive a message (move to the queue's archive table)
    pub async fn archive_message(&self, queue_name: &str, message_id: i64) -> MessagingResult<()> {
        self.pgmq.archive(queue_name, message_id).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "archive", e.to_string())
        })?;

        debug!(
            queue = queue_name,
            message_id = message_id,
            "Message archived"
        );
        Ok(())
    }

    /// Purge a queue (delete all messages)
    pub async fn purge_queue(&self, queue_name: &str) -> MessagingResult<u64> {
        let purged = self.pgmq.purge(queue_name).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "purge", e.to_string())
        })?;

        debug!(queue = queue_name, purged = purged, "Queue purged");
        Ok(purged)
    }

    /// Drop a queue completely
    pub async fn drop_queue(&self, queue_name: &str) -> MessagingResult<()> {
        self.pgmq.destroy(queue_name).await.map_err(|e| {
            MessagingError::queue_operation(queue_name, "destroy", e.to_string())
        })?;

        debug!(queue = queue_name, "Queue dropped");
        Ok(())
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pgmq.connection
    }
}

#[async_trait::async_trait]
impl LearnQueue for PgmqClient {
    async fn enqueue_learn_job(&self, job: &LearnJob) -> MessagingResult<i64> {
        let message_id = self.send_json_message(queues::LEARN_QUEUE, job).await?;

        info!(
            job = queues::LEARN_JOB,
            queue = queues::LEARN_QUEUE,
            message_id = message_id,
            order_id = %job.order_id,
            tenant_id = %job.tenant_id,
            vendor_record_id = %job.vendor_record_id,
            "Learn job enqueued"
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pgmq_client_creation() {
        // Requires a PostgreSQL database with the pgmq extension
        if std::env::var("TEST_DATABASE_URL").is_err() {
            println!("Skipping pgmq test - no TEST_DATABASE_URL provided");
            return;
        }

        let database_url = std::env::var("TEST_DATABASE_URL").unwrap();
        let client = PgmqClient::new(&database_url).await;
        assert!(client.is_ok(), "Failed to create pgmq client: {client:?}");
    }

    #[tokio::test]
    async fn test_shared_pool_pattern() {
        if std::env::var("TEST_DATABASE_URL").is_err() {
            println!("Skipping shared pool test - no TEST_DATABASE_URL provided");
            return;
        }

        let database_url = std::env::var("TEST_DATABASE_URL").unwrap();

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to create connection pool");

        let client = PgmqClient::new_with_pool(pool.clone()).await;

        assert_eq!(client.pool().size(), pool.size());
    }

    #[tokio::test]
    async fn test_learn_job_send_and_read() {
        if std::env::var("TEST_DATABASE_URL").is_err() {
            println!("Skipping send/read test - no TEST_DATABASE_URL provided");
            return;
        }

        let database_url = std::env::var("TEST_DATABASE_URL").unwrap();
        let client = PgmqClient::new(&database_url)
            .await
            .expect("Failed to create client");

        let test_queue = "test_pickwalk_send_read";
        client
            .create_queue(test_queue)
            .await
            .expect("Failed to create test queue");

        let job = LearnJob::new("order-42", "tenant-9", "vendor-3");
        let message_id = client
            .send_json_message(test_queue, &job)
            .await
            .expect("Failed to send job");
        assert!(message_id > 0, "Message ID should be positive");

        let messages = client
            .read_messages(test_queue, Some(30), 10)
            .await
            .expect("Failed to read messages");
        assert_eq!(messages.len(), 1);

        let read_back: LearnJob =
            serde_json::from_value(messages[0].message.clone()).expect("Failed to parse job");
        assert_eq!(read_back, job);

        client
            .drop_queue(test_queue)
            .await
            .expect("Failed to drop test queue");
    }
}
