//! Cache provider with graceful degradation
//!
//! Uses enum dispatch for zero-cost abstraction. Consumers use
//! `CacheProvider` and never deal with concrete backends directly.

use super::errors::CacheResult;
use super::providers::{NoOpCacheService, RedisCacheService};
use super::traits::CacheService;
use std::time::Duration;
use tracing::{info, warn};

/// Internal cache backend enum for zero-cost dispatch
///
/// This is an implementation detail. Consumers should use `CacheProvider`.
#[derive(Debug, Clone)]
enum CacheBackend {
    /// Redis cache provider (boxed to reduce enum size)
    Redis(Box<RedisCacheService>),

    /// No-op cache provider (always miss, always succeed)
    NoOp(NoOpCacheService),
}

impl CacheBackend {
    fn provider_name(&self) -> &'static str {
        match self {
            Self::Redis(s) => s.provider_name(),
            Self::NoOp(s) => s.provider_name(),
        }
    }

    fn is_enabled(&self) -> bool {
        !matches!(self, Self::NoOp(_))
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        match self {
            Self::Redis(s) => s.get(key).await,
            Self::NoOp(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        match self {
            Self::Redis(s) => s.set(key, value, ttl).await,
            Self::NoOp(s) => s.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        match self {
            Self::Redis(s) => s.delete(key).await,
            Self::NoOp(s) => s.delete(key).await,
        }
    }

    async fn health_check(&self) -> CacheResult<bool> {
        match self {
            Self::Redis(s) => s.health_check().await,
            Self::NoOp(s) => s.health_check().await,
        }
    }
}

/// Unified cache interface over the configured backend
///
/// Cost models are small JSON blobs, so the interface stays string-based
/// and callers handle their own serialization.
#[derive(Debug, Clone)]
pub struct CacheProvider {
    backend: CacheBackend,
}

impl CacheProvider {
    /// Create a cache provider from an optional Redis URL with graceful degradation
    ///
    /// If a URL is given but the connection fails, logs a warning and
    /// returns a NoOp provider instead. The worker never fails to start
    /// due to cache issues.
    pub async fn from_url_graceful(redis_url: Option<&str>) -> Self {
        let backend = match redis_url {
            Some(url) => match RedisCacheService::connect(url).await {
                Ok(service) => {
                    info!(backend = "redis", "Cost model cache initialized");
                    CacheBackend::Redis(Box::new(service))
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "Failed to connect to Redis, falling back to NoOp cache (graceful degradation)"
                    );
                    CacheBackend::NoOp(NoOpCacheService::new())
                }
            },
            None => {
                info!("No Redis URL configured, cost model cache disabled");
                CacheBackend::NoOp(NoOpCacheService::new())
            }
        };

        Self { backend }
    }

    /// Create a NoOp provider (for explicit opt-out or testing)
    pub fn noop() -> Self {
        Self {
            backend: CacheBackend::NoOp(NoOpCacheService::new()),
        }
    }

    /// Check if caching is actually enabled (not NoOp)
    pub fn is_enabled(&self) -> bool {
        self.backend.is_enabled()
    }

    /// Get the provider name
    pub fn provider_name(&self) -> &'static str {
        self.backend.provider_name()
    }

    /// Get a value from cache
    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.backend.get(key).await
    }

    /// Set a value in cache with TTL
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.backend.set(key, value, ttl).await
    }

    /// Delete a specific key
    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        self.backend.delete(key).await
    }

    /// Health check the cache backend
    pub async fn health_check(&self) -> CacheResult<bool> {
        self.backend.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_provider_is_not_enabled() {
        let provider = CacheProvider::noop();
        assert!(!provider.is_enabled());
        assert_eq!(provider.provider_name(), "noop");
    }

    #[tokio::test]
    async fn test_from_url_none_falls_back_to_noop() {
        let provider = CacheProvider::from_url_graceful(None).await;
        assert!(!provider.is_enabled());
        assert_eq!(provider.provider_name(), "noop");
    }

    #[tokio::test]
    async fn test_from_url_unreachable_falls_back_to_noop() {
        // Invalid URL scheme fails at client creation, no network needed
        let provider = CacheProvider::from_url_graceful(Some("not-a-redis-url")).await;
        assert!(!provider.is_enabled());
    }

    #[tokio::test]
    async fn test_noop_round_trip_always_misses() {
        let provider = CacheProvider::noop();
        provider
            .set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(provider.get("k").await.unwrap(), None);
    }
}
