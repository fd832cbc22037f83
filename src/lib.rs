#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Pickwalk Core
//!
//! Learns warehouse travel costs from completed pickwalks.
//!
//! ## Overview
//!
//! Marketplace tenants fulfill orders by walking pickers through zoned
//! warehouses. Every `order.item.picked` event carries enough signal to
//! reconstruct the walk after the fact: consecutive picks for the same
//! vendor, ordered by timestamp, describe zone-to-zone movements and how
//! long each took. This crate turns that exhaust into per-vendor cost
//! models that downstream route planners read from the cache.
//!
//! ## Architecture
//!
//! Two cooperating components run inside one worker process:
//!
//! - The **event consumer** polls the platform's domain events queue,
//!   validates `order.item.picked` payloads, and enqueues learn jobs.
//! - The **cost learner** consumes learn jobs, discovers what each
//!   tenant's schema supports, reads the vendor's picks in order,
//!   extracts bounded zone transitions, and merges them into the cached
//!   cost model under a sliding TTL.
//!
//! Both queues live in PostgreSQL (pgmq), so a single database carries
//! tenant data and messaging. Cost models live in Redis and degrade to a
//! no-op cache when Redis is unavailable.
//!
//! ## Module Organization
//!
//! - [`events`] - domain event envelope, pick listener, polling consumer
//! - [`learner`] - the cost learning worker
//! - [`models`] - picked items, transitions, cost models
//! - [`database`] - connection pooling and tenant schema discovery
//! - [`messaging`] - pgmq queue client and learn job wire format
//! - [`cache`] - Redis-backed model storage with graceful degradation
//! - [`config`] - environment-driven worker configuration
//! - [`error`] - structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pickwalk_core::config::WorkerConfig;
//! use pickwalk_core::learner::CostLearner;
//! use pickwalk_core::messaging::PgmqClient;
//! use pickwalk_core::cache::CacheProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WorkerConfig::from_env();
//! config.validate()?;
//!
//! let pool = sqlx::PgPool::connect("postgresql://localhost/marketplace").await?;
//! let client = Arc::new(PgmqClient::new_with_pool(pool.clone()).await);
//! let cache = Arc::new(CacheProvider::from_url_graceful(config.redis_url.as_deref()).await);
//!
//! let learner = Arc::new(CostLearner::new(pool, client, cache, config.learner)?);
//! learner.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod events;
pub mod learner;
pub mod logging;
pub mod messaging;
pub mod models;

pub use cache::CacheProvider;
pub use config::{ConsumerConfig, LearnerConfig, WorkerConfig};
pub use error::{PickwalkError, Result};
pub use events::{DomainEvent, EventConsumer, HandleOutcome, PickEventListener};
pub use learner::{CostLearner, LearnOutcome};
pub use messaging::{LearnJob, LearnQueue, PgmqClient};
pub use models::{CostModel, EdgeCost, PickedItem, Transition};
