//! # Worker Configuration
//!
//! Environment-derived configuration for the event consumer and cost
//! learner. Both backends are optional at startup: a missing database URL
//! makes the worker refuse to start (nothing can run without the relational
//! store), while a missing Redis URL degrades the cache to a no-op provider
//! with a warning.

use crate::constants::{cache, queues, transitions};
use crate::error::{PickwalkError, Result};
use std::time::Duration;

/// Top-level configuration for the pickwalk worker process
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// PostgreSQL connection URL (also carries the pgmq queues)
    pub database_url: Option<String>,
    /// Redis connection URL for the cost model cache
    pub redis_url: Option<String>,
    /// Maximum connections for the shared PgPool
    pub max_db_connections: u32,
    /// Event consumer settings
    pub consumer: ConsumerConfig,
    /// Cost learner settings
    pub learner: LearnerConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            redis_url: None,
            max_db_connections: 10,
            consumer: ConsumerConfig::default(),
            learner: LearnerConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables
    ///
    /// `PICKWALK_DATABASE_URL` falls back to `DATABASE_URL`, and
    /// `PICKWALK_REDIS_URL` falls back to `REDIS_URL`, so the worker can
    /// share connection settings with the surrounding platform.
    pub fn from_env() -> Self {
        let database_url = std::env::var("PICKWALK_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .ok();
        let redis_url = std::env::var("PICKWALK_REDIS_URL")
            .or_else(|_| std::env::var("REDIS_URL"))
            .ok();

        let consumer = ConsumerConfig {
            namespace: env_or("PICKWALK_EVENT_NAMESPACE", queues::DEFAULT_EVENT_NAMESPACE),
            batch_size: env_parse("PICKWALK_CONSUMER_BATCH_SIZE", 10),
            visibility_timeout_seconds: env_parse("PICKWALK_CONSUMER_VISIBILITY_TIMEOUT", 300),
            polling_interval_ms: env_parse("PICKWALK_CONSUMER_POLL_INTERVAL_MS", 1000),
            max_processing_attempts: env_parse("PICKWALK_CONSUMER_MAX_ATTEMPTS", 3),
        };

        let learner = LearnerConfig {
            queue_name: queues::LEARN_QUEUE.to_string(),
            batch_size: env_parse("PICKWALK_LEARNER_BATCH_SIZE", 10),
            visibility_timeout_seconds: env_parse("PICKWALK_LEARNER_VISIBILITY_TIMEOUT", 300),
            polling_interval_ms: env_parse("PICKWALK_LEARNER_POLL_INTERVAL_MS", 1000),
            max_processing_attempts: env_parse("PICKWALK_LEARNER_MAX_ATTEMPTS", 3),
            max_transition_seconds: transitions::MAX_TRANSITION_SECONDS,
            model_ttl: Duration::from_secs(cache::COST_MODEL_TTL_SECONDS),
        };

        Self {
            database_url,
            redis_url,
            max_db_connections: env_parse("PICKWALK_MAX_DB_CONNECTIONS", 10),
            consumer,
            learner,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.consumer.validate()?;
        self.learner.validate()?;

        if self.max_db_connections < 1 {
            return Err(PickwalkError::ConfigurationError(
                "max_db_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration for the pick event consumer
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Namespace for the event consumer (determines queue name)
    pub namespace: String,
    /// Number of messages to fetch per batch
    pub batch_size: i32,
    /// Visibility timeout for messages being processed (seconds)
    pub visibility_timeout_seconds: i32,
    /// Polling interval when the queue is idle (milliseconds)
    pub polling_interval_ms: u64,
    /// Maximum delivery attempts before a failing event is archived
    pub max_processing_attempts: i32,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            namespace: queues::DEFAULT_EVENT_NAMESPACE.to_string(),
            batch_size: 10,
            visibility_timeout_seconds: 300,
            polling_interval_ms: 1000,
            max_processing_attempts: 3,
        }
    }
}

impl ConsumerConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(PickwalkError::ConfigurationError(
                "namespace cannot be empty".to_string(),
            ));
        }

        if self.batch_size < 1 {
            return Err(PickwalkError::ConfigurationError(
                "batch_size must be at least 1".to_string(),
            ));
        }

        if self.max_processing_attempts < 1 {
            return Err(PickwalkError::ConfigurationError(
                "max_processing_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the domain events queue name for this namespace
    pub fn domain_events_queue(&self) -> String {
        format!("{}_domain_events", self.namespace)
    }

    /// Polling interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}

/// Configuration for the cost learner worker
#[derive(Debug, Clone)]
pub struct LearnerConfig {
    /// Queue to poll for learn jobs
    pub queue_name: String,
    /// Number of messages to read per batch
    pub batch_size: i32,
    /// Visibility timeout for messages (seconds)
    pub visibility_timeout_seconds: i32,
    /// Polling interval when no messages (milliseconds)
    pub polling_interval_ms: u64,
    /// Maximum processing attempts before a job is archived
    pub max_processing_attempts: i32,
    /// Ceiling on a single zone transition, in seconds
    pub max_transition_seconds: f64,
    /// Sliding expiry applied to cost models on every write
    pub model_ttl: Duration,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            queue_name: queues::LEARN_QUEUE.to_string(),
            batch_size: 10,
            visibility_timeout_seconds: 300,
            polling_interval_ms: 1000,
            max_processing_attempts: 3,
            max_transition_seconds: transitions::MAX_TRANSITION_SECONDS,
            model_ttl: Duration::from_secs(cache::COST_MODEL_TTL_SECONDS),
        }
    }
}

impl LearnerConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.queue_name.is_empty() {
            return Err(PickwalkError::ConfigurationError(
                "queue_name cannot be empty".to_string(),
            ));
        }

        if self.batch_size < 1 {
            return Err(PickwalkError::ConfigurationError(
                "batch_size must be at least 1".to_string(),
            ));
        }

        if self.max_processing_attempts < 1 {
            return Err(PickwalkError::ConfigurationError(
                "max_processing_attempts must be at least 1".to_string(),
            ));
        }

        if self.max_transition_seconds <= 0.0 {
            return Err(PickwalkError::ConfigurationError(
                "max_transition_seconds must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Polling interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
