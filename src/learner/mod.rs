//! # Cost Learner Worker
//!
//! Consumes learn jobs from the `pickwalk_learn` queue. For each job the
//! learner discovers the tenant schema's capabilities, reads the vendor's
//! picked items in pick order, extracts bounded zone transitions, and
//! merges them into the vendor's cached cost model with a sliding TTL.
//!
//! ## Queue Lifecycle
//!
//! - Success (learned or cleanly skipped) deletes the message
//! - Transient failure leaves the message for redelivery
//! - Malformed jobs and jobs past the attempt limit are archived

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use pgmq::types::Message;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};

use crate::cache::CacheProvider;
use crate::config::LearnerConfig;
use crate::database::schema::{tenant_schema_name, SchemaCapabilities};
use crate::error::{PickwalkError, Result};
use crate::messaging::{LearnJob, PgmqClient};
use crate::models::{extract_transitions, CostModel, PickedItem, Transition};

/// Outcome of one learn job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnOutcome {
    /// Transitions merged and the cached model rewritten
    Learned {
        /// Transitions folded into the model by this job
        transitions: usize,
        /// Distinct edges in the model after the merge
        edges: usize,
    },
    /// Tenant schema carries no product-vendor link; nothing to learn
    SkippedNoVendorPath,
    /// Fewer than two picked items; no transition is possible
    SkippedTooFewItems,
    /// Items were picked but every candidate transition was out of bounds
    SkippedNoTransitions,
}

/// Statistics for learner observability
#[derive(Debug, Default)]
pub struct CostLearnerStats {
    /// Total number of polling cycles executed
    pub polling_cycles: AtomicU64,
    /// Jobs that produced a model update
    pub jobs_learned: AtomicU64,
    /// Jobs that completed as clean no-ops
    pub jobs_skipped: AtomicU64,
    /// Jobs that failed transiently
    pub jobs_failed: AtomicU64,
    /// Jobs archived (malformed or past the attempt limit)
    pub jobs_archived: AtomicU64,
    /// Total transitions merged across all jobs
    pub transitions_merged: AtomicU64,
}

impl CostLearnerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_polling_cycles(&self) -> u64 {
        self.polling_cycles.load(Ordering::Relaxed)
    }

    pub fn get_jobs_learned(&self) -> u64 {
        self.jobs_learned.load(Ordering::Relaxed)
    }

    pub fn get_jobs_skipped(&self) -> u64 {
        self.jobs_skipped.load(Ordering::Relaxed)
    }

    pub fn get_jobs_failed(&self) -> u64 {
        self.jobs_failed.load(Ordering::Relaxed)
    }

    pub fn get_jobs_archived(&self) -> u64 {
        self.jobs_archived.load(Ordering::Relaxed)
    }

    pub fn get_transitions_merged(&self) -> u64 {
        self.transitions_merged.load(Ordering::Relaxed)
    }
}

/// Worker that learns pickwalk costs from completed orders
pub struct CostLearner {
    /// Pool for tenant schema queries
    pool: PgPool,
    /// Queue client shared with the rest of the worker
    client: Arc<PgmqClient>,
    /// Cost model storage
    cache: Arc<CacheProvider>,
    /// Learner configuration
    config: LearnerConfig,
    /// Running state flag
    running: Arc<AtomicBool>,
    /// Statistics for observability
    stats: Arc<CostLearnerStats>,
}

impl CostLearner {
    /// Create a new cost learner
    pub fn new(
        pool: PgPool,
        client: Arc<PgmqClient>,
        cache: Arc<CacheProvider>,
        config: LearnerConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            pool,
            client,
            cache,
            config,
            running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(CostLearnerStats::new()),
        })
    }

    /// Start the learner polling loop
    ///
    /// Ensures the learn queue exists, then spawns the background polling
    /// task and returns.
    #[instrument(skip(self), fields(queue = %self.config.queue_name))]
    pub async fn start(self: Arc<Self>) -> Result<()> {
        self.client.create_queue(&self.config.queue_name).await?;

        info!(
            queue = %self.config.queue_name,
            poll_interval = ?self.config.poll_interval(),
            batch_size = self.config.batch_size,
            cache = self.cache.provider_name(),
            "Starting cost learner"
        );

        self.running.store(true, Ordering::SeqCst);

        let learner = self.clone();
        tokio::spawn(async move {
            if let Err(e) = learner.polling_loop().await {
                error!("Cost learner polling loop failed: {}", e);
            }
        });

        Ok(())
    }

    /// Stop the learner
    #[instrument(skip(self), fields(queue = %self.config.queue_name))]
    pub async fn stop(&self) {
        info!(queue = %self.config.queue_name, "Stopping cost learner");

        self.running.store(false, Ordering::SeqCst);

        // Wait a bit for the polling loop to finish its current iteration
        tokio::time::sleep(self.config.poll_interval()).await;

        info!(queue = %self.config.queue_name, "Cost learner stopped");
    }

    /// Check if the learner is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get learner statistics
    pub fn get_stats(&self) -> Arc<CostLearnerStats> {
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
                    queue = %self.config.queue_name,
                    error = %e,
                    "Poll iteration failed"
                );
            }
        }

        info!(queue = %self.config.queue_name, "Polling loop exited");

        Ok(())
    }

    /// Execute a single poll iteration
    async fn poll_once(&self) -> Result<()> {
        let messages = self
            .client
            .read_messages(
                &self.config.queue_name,
                Some(self.config.visibility_timeout_seconds),
                self.config.batch_size,
            )
            .await?;

        if messages.is_empty() {
            return Ok(());
        }

        debug!(
            queue = %self.config.queue_name,
            count = messages.len(),
            "Processing learn job batch"
        );

        for message in messages {
            self.process_message(message).await;
        }

        Ok(())
    }

    /// Process a single queue message
    ///
    /// Never returns an error: each failure mode resolves to a queue
    /// action (archive, delete, or leave for redelivery) so one bad job
    /// cannot stall the batch.
    async fn process_message(&self, message: Message<serde_json::Value>) {
        let queue_name = &self.config.queue_name;

        let job: LearnJob = match serde_json::from_value(message.message.clone()) {
            Ok(job) => job,
            Err(e) => {
                warn!(
                    msg_id = message.msg_id,
                    error = %e,
                    "Archiving malformed learn job"
                );
                self.stats.jobs_archived.fetch_add(1, Ordering::Relaxed);

                if let Err(archive_err) =
                    self.client.archive_message(queue_name, message.msg_id).await
                {
                    error!(
                        msg_id = message.msg_id,
                        error = %archive_err,
                        "Failed to archive malformed learn job"
                    );
                }
                return;
            }
        };

        match self.learn(&job).await {
            Ok(outcome) => {
                match outcome {
                    LearnOutcome::Learned { transitions, .. } => {
                        self.stats.jobs_learned.fetch_add(1, Ordering::Relaxed);
                        self.stats
                            .transitions_merged
                            .fetch_add(transitions as u64, Ordering::Relaxed);
                    }
                    LearnOutcome::SkippedNoVendorPath
                    | LearnOutcome::SkippedTooFewItems
                    | LearnOutcome::SkippedNoTransitions => {
                        self.stats.jobs_skipped.fetch_add(1, Ordering::Relaxed);
                    }
                }

                if let Err(e) = self.client.delete_message(queue_name, message.msg_id).await {
                    error!(
                        msg_id = message.msg_id,
                        error = %e,
                        "Failed to delete completed learn job"
                    );
                }
            }
            Err(e) => {
                self.stats.jobs_failed.fetch_add(1, Ordering::Relaxed);

                if message.read_ct >= self.config.max_processing_attempts {
                    error!(
                        msg_id = message.msg_id,
                        order_id = %job.order_id,
                        attempts = message.read_ct,
                        error = %e,
                        "Learn job exhausted its attempts, archiving"
                    );
                    self.stats.jobs_archived.fetch_add(1, Ordering::Relaxed);

                    if let Err(archive_err) =
                        self.client.archive_message(queue_name, message.msg_id).await
                    {
                        error!(
                            msg_id = message.msg_id,
                            error = %archive_err,
                            "Failed to archive exhausted learn job"
                        );
                    }
                } else {
                    warn!(
                        msg_id = message.msg_id,
                        order_id = %job.order_id,
                        attempt = message.read_ct,
                        error = %e,
                        "Learn job failed, leaving for retry"
                    );
                }
            }
        }
    }

    /// Run one learn job end to end
    ///
    /// The cache merge is read-modify-write without a lock: two workers
    /// learning the same vendor concurrently can lose one merge. The
    /// models are advisory statistics rebuilt continuously from new
    /// orders, so a rare lost merge is tolerated. Redelivered jobs merge
    /// their order again for the same reason.
    #[instrument(skip(self, job), fields(
        order_id = %job.order_id,
        tenant_id = %job.tenant_id,
        vendor_record_id = %job.vendor_record_id
    ))]
    pub async fn learn(&self, job: &LearnJob) -> Result<LearnOutcome> {
        let schema_name = tenant_schema_name(&job.tenant_id);

        let capabilities = SchemaCapabilities::discover(&self.pool, &schema_name)
            .await
            .map_err(|e| {
                PickwalkError::SchemaDiscoveryError(format!(
                    "Capability probe failed for {schema_name}: {e}"
                ))
            })?;

        // A schema that never existed probes as all-false and lands here too
        let Some(vendor_path) = capabilities.vendor_path() else {
            info!(
                schema = %schema_name,
                "Tenant schema has no product-vendor link, nothing to learn"
            );
            return Ok(LearnOutcome::SkippedNoVendorPath);
        };

        let items = PickedItem::in_pick_order(
            &self.pool,
            &schema_name,
            vendor_path,
            capabilities.zones_resolvable(),
            &job.tenant_id,
            &job.vendor_record_id,
            &job.order_id,
        )
        .await?;

        if items.len() < 2 {
            debug!(items = items.len(), "Too few picked items for transitions");
            return Ok(LearnOutcome::SkippedTooFewItems);
        }

        let transitions = extract_transitions(&items, self.config.max_transition_seconds);

        if transitions.is_empty() {
            debug!(
                items = items.len(),
                "All candidate transitions were out of bounds"
            );
            return Ok(LearnOutcome::SkippedNoTransitions);
        }

        let edges = self
            .merge_into_cache(&job.vendor_record_id, &transitions)
            .await?;

        info!(
            items = items.len(),
            transitions = transitions.len(),
            edges = edges,
            "Merged zone transitions into cost model"
        );

        Ok(LearnOutcome::Learned {
            transitions: transitions.len(),
            edges,
        })
    }

    /// Merge transitions into the vendor's cached model
    ///
    /// Returns the number of distinct edges in the model after the merge.
    async fn merge_into_cache(
        &self,
        vendor_record_id: &str,
        transitions: &[Transition],
    ) -> Result<usize> {
        let key = CostModel::cache_key(vendor_record_id);

        let mut model = match self.cache.get(&key).await? {
            Some(json) => match CostModel::from_json(&json) {
                Ok(model) => model,
                Err(e) => {
                    // A corrupt entry self-heals on the next write
                    warn!(
                        key = %key,
                        error = %e,
                        "Cached cost model is corrupt, starting fresh"
                    );
                    CostModel::new()
                }
            },
            None => CostModel::new(),
        };

        model.merge_transitions(transitions);

        let json = model
            .to_json()
            .map_err(|e| PickwalkError::CacheError(format!("Cost model serialization: {e}")))?;

        self.cache.set(&key, &json, self.config.model_ttl).await?;

        Ok(model.edge_count())
    }
}

impl std::fmt::Debug for CostLearner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostLearner")
            .field("config", &self.config)
            .field("cache", &self.cache.provider_name())
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("stats", &self.stats)
            .finish()
    }
}

impl Clone for CostLearner {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            client: self.client.clone(),
            cache: self.cache.clone(),
            config: self.config.clone(),
            running: self.running.clone(),
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The learn path needs a provisioned tenant schema; the end-to-end
    // flow is covered by the integration tests.

    #[test]
    fn test_stats_counters() {
        let stats = CostLearnerStats::new();

        assert_eq!(stats.get_polling_cycles(), 0);
        assert_eq!(stats.get_jobs_learned(), 0);
        assert_eq!(stats.get_jobs_skipped(), 0);
        assert_eq!(stats.get_jobs_failed(), 0);
        assert_eq!(stats.get_jobs_archived(), 0);
        assert_eq!(stats.get_transitions_merged(), 0);

        stats.jobs_learned.fetch_add(2, Ordering::Relaxed);
        stats.transitions_merged.fetch_add(7, Ordering::Relaxed);

        assert_eq!(stats.get_jobs_learned(), 2);
        assert_eq!(stats.get_transitions_merged(), 7);
    }

    #[test]
    fn test_learn_outcome_classification() {
        let learned = LearnOutcome::Learned {
            transitions: 3,
            edges: 2,
        };
        assert_ne!(learned, LearnOutcome::SkippedNoVendorPath);
        assert_ne!(
            LearnOutcome::SkippedTooFewItems,
            LearnOutcome::SkippedNoTransitions
        );
    }
}
