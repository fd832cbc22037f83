//! # Pickwalk Worker
//!
//! Runs the event consumer and cost learner as one standalone process.
//! This is the production deployment target for the pickwalk pipeline.
//!
//! ## Usage
//!
//! ```bash
//! PICKWALK_DATABASE_URL=postgresql://localhost/marketplace \
//! PICKWALK_REDIS_URL=redis://localhost:6379 \
//! cargo run --bin pickwalk-worker
//! ```

use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};

use pickwalk_core::cache::CacheProvider;
use pickwalk_core::config::WorkerConfig;
use pickwalk_core::database::DatabaseConnection;
use pickwalk_core::events::{EventConsumer, PickEventListener};
use pickwalk_core::learner::CostLearner;
use pickwalk_core::logging;
use pickwalk_core::messaging::PgmqClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for console logging
    logging::init_tracing();

    info!("🚀 Starting Pickwalk Worker...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!("   Environment: {}", logging::get_environment());

    let config = WorkerConfig::from_env();
    config.validate()?;

    info!("🔧 Connecting to PostgreSQL...");
    let connection = DatabaseConnection::connect(&config).await?;
    let pool = connection.pool().clone();

    let client = Arc::new(PgmqClient::new_with_pool(pool.clone()).await);
    let cache = Arc::new(CacheProvider::from_url_graceful(config.redis_url.as_deref()).await);

    match connection.health_check().await {
        Ok(true) => info!("   PostgreSQL health check passed"),
        Ok(false) => warn!("PostgreSQL health check returned unhealthy"),
        Err(e) => warn!(error = %e, "PostgreSQL health check failed"),
    }
    if cache.is_enabled() {
        match cache.health_check().await {
            Ok(true) => info!("   Redis health check passed"),
            Ok(false) => warn!("Redis health check returned unhealthy"),
            Err(e) => warn!(error = %e, "Redis health check failed"),
        }
    }

    let listener = PickEventListener::new(client.clone());
    let consumer = Arc::new(EventConsumer::new(
        client.clone(),
        listener,
        config.consumer.clone(),
    )?);
    let learner = Arc::new(CostLearner::new(
        pool,
        client.clone(),
        cache.clone(),
        config.learner.clone(),
    )?);

    consumer.clone().start().await?;
    learner.clone().start().await?;

    info!("🎉 Pickwalk worker started");
    info!("   Event queue: {}", config.consumer.domain_events_queue());
    info!("   Learn queue: {}", config.learner.queue_name);
    info!("   Cost model cache: {}", cache.provider_name());
    info!("   Press Ctrl+C to shutdown gracefully");

    // Wait for shutdown signal
    shutdown_signal().await;

    info!("🛑 Shutdown signal received, initiating graceful shutdown...");

    consumer.stop().await;
    learner.stop().await;

    let consumer_stats = consumer.get_stats();
    let learner_stats = learner.get_stats();
    info!(
        jobs_enqueued = consumer_stats.get_jobs_enqueued(),
        events_ignored = consumer_stats.get_events_ignored(),
        events_dropped = consumer_stats.get_events_dropped(),
        jobs_learned = learner_stats.get_jobs_learned(),
        jobs_skipped = learner_stats.get_jobs_skipped(),
        transitions_merged = learner_stats.get_transitions_merged(),
        "Final worker statistics"
    );

    connection.close().await;

    info!("👋 Pickwalk worker shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
