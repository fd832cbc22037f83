//! Redis cache provider
//!
//! Uses `redis::aio::ConnectionManager` for async multiplexed connections
//! with automatic reconnection.

use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::traits::CacheService;
use crate::logging::redact_url;
use std::time::Duration;
use tracing::debug;

/// Redis-backed cache service using ConnectionManager
#[derive(Clone)]
pub struct RedisCacheService {
    connection_manager: redis::aio::ConnectionManager,
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("connection_manager", &"ConnectionManager")
            .finish()
    }
}

impl RedisCacheService {
    /// Create a new Redis cache service from a connection URL
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let connection_manager = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| {
                CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
            })?;

        debug!(url = %redact_url(url), "Redis cache service connected");

        Ok(Self { connection_manager })
    }
}

impl CacheService for RedisCacheService {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let result: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis GET failed: {}", e)))?;

        if result.is_some() {
            debug!(key = key, "Cache HIT");
        } else {
            debug!(key = key, "Cache MISS");
        }

        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        let ttl_seconds = ttl.as_secs().max(1);

        redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_seconds)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis SETEX failed: {}", e)))?;

        debug!(key = key, ttl_seconds = ttl_seconds, "Cache SET");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();

        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis DEL failed: {}", e)))?;

        debug!(key = key, "Cache DEL");
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection_manager.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendError(format!("Redis PING failed: {}", e)))?;

        Ok(pong == "PONG")
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_redis_url() -> Option<String> {
        std::env::var("TEST_REDIS_URL").ok()
    }

    #[tokio::test]
    async fn test_redis_crud_operations() {
        // Requires a running Redis instance
        let Some(url) = test_redis_url() else {
            println!("Skipping Redis test - no TEST_REDIS_URL provided");
            return;
        };

        let svc = RedisCacheService::connect(&url)
            .await
            .expect("Failed to connect to Redis");

        let key = format!("test:crud:{}", uuid::Uuid::new_v4());
        let value = r#"{"A->B":{"sum":40.0,"count":1}}"#;

        svc.set(&key, value, Duration::from_secs(60)).await.unwrap();

        let result = svc.get(&key).await.unwrap();
        assert_eq!(result, Some(value.to_string()));

        svc.delete(&key).await.unwrap();

        let result = svc.get(&key).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_redis_ttl_expiry() {
        let Some(url) = test_redis_url() else {
            println!("Skipping Redis test - no TEST_REDIS_URL provided");
            return;
        };

        let svc = RedisCacheService::connect(&url)
            .await
            .expect("Failed to connect to Redis");

        let key = format!("test:ttl:{}", uuid::Uuid::new_v4());

        svc.set(&key, "temporary", Duration::from_secs(1))
            .await
            .unwrap();

        assert!(svc.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(svc.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_health_check() {
        let Some(url) = test_redis_url() else {
            println!("Skipping Redis test - no TEST_REDIS_URL provided");
            return;
        };

        let svc = RedisCacheService::connect(&url)
            .await
            .expect("Failed to connect to Redis");

        assert!(svc.health_check().await.unwrap());
    }
}
