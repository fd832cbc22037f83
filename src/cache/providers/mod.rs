//! Concrete cache provider implementations

pub mod noop;
pub mod redis;

pub use noop::NoOpCacheService;
pub use redis::RedisCacheService;
