//! # Event Consumer Service
//!
//! Polling-based consumer for the namespace domain events queue.
//!
//! ## Architecture
//!
//! - **Polling Loop**: Uses `tokio::time::interval` for periodic queue polling
//! - **Event Dispatch**: Feeds each event to the [`PickEventListener`]
//! - **Queue Lifecycle**: Handled events are deleted, malformed envelopes
//!   are archived, transient failures stay visible for redelivery until
//!   the delivery attempt ceiling archives them
//! - **Observability**: Atomic counters exposed via [`EventConsumerStats`]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use pgmq::types::Message;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ConsumerConfig;
use crate::error::Result;
use crate::events::listener::{HandleOutcome, PickEventListener};
use crate::events::types::DomainEvent;
use crate::messaging::PgmqClient;

/// Statistics for event consumer observability
#[derive(Debug, Default)]
pub struct EventConsumerStats {
    /// Total number of polling cycles executed
    pub polling_cycles: AtomicU64,
    /// Total number of learn jobs enqueued
    pub jobs_enqueued: AtomicU64,
    /// Total number of events ignored (other event names)
    pub events_ignored: AtomicU64,
    /// Total number of events dropped (malformed, incomplete, or exhausted)
    pub events_dropped: AtomicU64,
    /// Total number of events that failed transiently
    pub events_failed: AtomicU64,
}

impl EventConsumerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_polling_cycles(&self) -> u64 {
        self.polling_cycles.load(Ordering::Relaxed)
    }

    pub fn get_jobs_enqueued(&self) -> u64 {
        self.jobs_enqueued.load(Ordering::Relaxed)
    }

    pub fn get_events_ignored(&self) -> u64 {
        self.events_ignored.load(Ordering::Relaxed)
    }

    pub fn get_events_dropped(&self) -> u64 {
        self.events_dropped.load(Ordering::Relaxed)
    }

    pub fn get_events_failed(&self) -> u64 {
        self.events_failed.load(Ordering::Relaxed)
    }
}

/// Event consumer that polls the domain events queue and dispatches to
/// the pick event listener
pub struct EventConsumer {
    /// Queue client shared with the rest of the worker
    client: Arc<PgmqClient>,
    /// Listener handling each event
    listener: PickEventListener,
    /// Consumer configuration
    config: ConsumerConfig,
    /// Running state flag
    running: Arc<AtomicBool>,
    /// Statistics for observability
    stats: Arc<EventConsumerStats>,
}

impl EventConsumer {
    /// Create a new event consumer
    pub fn new(
        client: Arc<PgmqClient>,
        listener: PickEventListener,
        config: ConsumerConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            client,
            listener,
            config,
            running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(EventConsumerStats::new()),
        })
    }

    /// Start the event consumer polling loop
    ///
    /// Ensures the namespace queue exists, then spawns the background
    /// polling task and returns.
    #[instrument(skip(self), fields(namespace = %self.config.namespace))]
    pub async fn start(self: Arc<Self>) -> Result<()> {
        let queue_name = self.config.domain_events_queue();
        self.client.create_queue(&queue_name).await?;

        info!(
            queue = %queue_name,
            poll_interval = ?self.config.poll_interval(),
            batch_size = self.config.batch_size,
            "Starting event consumer"
        );

        self.running.store(true, Ordering::SeqCst);

        let consumer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = consumer.polling_loop().await {
                error!("Event consumer polling loop failed: {}", e);
            }
        });

        Ok(())
    }

    /// Stop the event consumer
    #[instrument(skip(self), fields(namespace = %self.config.namespace))]
    pub async fn stop(&self) {
        info!(namespace = %self.config.namespace, "Stopping event consumer");

        self.running.store(false, Ordering::SeqCst);

        // Wait a bit for the polling loop to finish its current iteration
        tokio::time::sleep(self.config.poll_interval()).await;

        info!(namespace = %self.config.namespace, "Event consumer stopped");
    }

    /// Check if the consumer is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get consumer statistics
    pub fn get_stats(&self) -> Arc<EventConsumerStats> {
        self.stats.clone()
    }

    /// Main polling loop
    async fn polling_loop(self: Arc<Self>) -> Result<()> {
        let mut interval = tokio::time::interval(self.config.poll_interval());

        while self.running.load(Ordering::SeqCst) {
            interval.tick().await;

            self.stats.polling_cycles.fetch_add(1, Ordering::Relaxed);

            if let Err(e) = self.poll_once().await {
                warn!(
                    namespace = %self.config.namespace,
                    error = %e,
                    "Poll iteration failed"
                );
            }
        }

        info!(namespace = %self.config.namespace, "Polling loop exited");

        Ok(())
    }

    /// Execute a single poll iteration
    async fn poll_once(&self) -> Result<()> {
        let queue_name = self.config.domain_events_queue();

        let messages = self
            .client
            .read_messages(
                &queue_name,
                Some(self.config.visibility_timeout_seconds),
                self.config.batch_size,
            )
            .await?;

        if messages.is_empty() {
            return Ok(());
        }

        debug!(
            queue = %queue_name,
            count = messages.len(),
            "Processing domain events batch"
        );

        for message in messages {
            self.process_message(&queue_name, message).await;
        }

        Ok(())
    }

    /// Process a single queue message
    ///
    /// Never returns an error: each failure mode resolves to a queue
    /// action (archive, delete, or leave for redelivery) so one bad
    /// message cannot stall the batch.
    async fn process_message(&self, queue_name: &str, message: Message<serde_json::Value>) {
        let event: DomainEvent = match serde_json::from_value(message.message.clone()) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    msg_id = message.msg_id,
                    error = %e,
                    "Archiving malformed domain event envelope"
                );
                self.stats.events_dropped.fetch_add(1, Ordering::Relaxed);

                if let Err(archive_err) =
                    self.client.archive_message(queue_name, message.msg_id).await
                {
                    error!(
                        msg_id = message.msg_id,
                        error = %archive_err,
                        "Failed to archive malformed envelope"
                    );
                }
                return;
            }
        };

        match self.listener.handle_event(&event).await {
            Ok(outcome) => {
                match outcome {
                    HandleOutcome::Enqueued(_) => {
                        self.stats.jobs_enqueued.fetch_add(1, Ordering::Relaxed);
                    }
                    HandleOutcome::Ignored => {
                        self.stats.events_ignored.fetch_add(1, Ordering::Relaxed);
                    }
                    HandleOutcome::Dropped => {
                        self.stats.events_dropped.fetch_add(1, Ordering::Relaxed);
                    }
                }

                if let Err(e) = self.client.delete_message(queue_name, message.msg_id).await {
                    error!(
                        msg_id = message.msg_id,
                        error = %e,
                        "Failed to delete handled event"
                    );
                }
            }
            Err(e) => {
                self.stats.events_failed.fetch_add(1, Ordering::Relaxed);

                if message.read_ct >= self.config.max_processing_attempts {
                    error!(
                        msg_id = message.msg_id,
                        event_id = %event.event_id,
                        attempts = message.read_ct,
                        error = %e,
                        "Event exhausted its delivery attempts, archiving"
                    );
                    self.stats.events_dropped.fetch_add(1, Ordering::Relaxed);

                    if let Err(archive_err) =
                        self.client.archive_message(queue_name, message.msg_id).await
                    {
                        error!(
                            msg_id = message.msg_id,
                            error = %archive_err,
                            "Failed to archive exhausted event"
                        );
                    }
                } else {
                    // Message becomes visible again after the visibility
                    // timeout
                    warn!(
                        msg_id = message.msg_id,
                        event_id = %event.event_id,
                        attempt = message.read_ct,
                        error = %e,
                        "Event handling failed, leaving message for redelivery"
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for EventConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventConsumer")
            .field("config", &self.config)
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("stats", &self.stats)
            .finish()
    }
}

impl Clone for EventConsumer {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            listener: self.listener.clone(),
            config: self.config.clone(),
            running: self.running.clone(),
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Consumer lifecycle needs a PostgreSQL instance with pgmq; the
    // end-to-end path is covered by the integration tests.

    #[test]
    fn test_stats_counters() {
        let stats = EventConsumerStats::new();

        assert_eq!(stats.get_polling_cycles(), 0);
        assert_eq!(stats.get_jobs_enqueued(), 0);
        assert_eq!(stats.get_events_ignored(), 0);
        assert_eq!(stats.get_events_dropped(), 0);
        assert_eq!(stats.get_events_failed(), 0);

        stats.polling_cycles.fetch_add(5, Ordering::Relaxed);
        stats.jobs_enqueued.fetch_add(3, Ordering::Relaxed);
        stats.events_ignored.fetch_add(2, Ordering::Relaxed);
        stats.events_dropped.fetch_add(2, Ordering::Relaxed);
        stats.events_failed.fetch_add(1, Ordering::Relaxed);

        assert_eq!(stats.get_polling_cycles(), 5);
        assert_eq!(stats.get_jobs_enqueued(), 3);
        assert_eq!(stats.get_events_ignored(), 2);
        assert_eq!(stats.get_events_dropped(), 2);
        assert_eq!(stats.get_events_failed(), 1);
    }
}
