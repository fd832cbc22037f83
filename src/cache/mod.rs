//! # Cost Model Cache
//!
//! Key-value storage for learned pickwalk cost models.
//!
//! ## Architecture
//!
//! ```text
//! CacheProvider (enum)            <- Zero-cost dispatch, no vtable
//!   ├── Redis(RedisCacheService)  <- ConnectionManager-based async Redis
//!   └── NoOp(NoOpCacheService)    <- Always-miss, always-succeed fallback
//! ```
//!
//! ## Design Decisions
//!
//! - **Graceful degradation**: Redis failure → NoOp fallback, the worker
//!   never fails to start due to cache issues
//! - **Sliding TTL**: every model write resets the expiry, so models for
//!   active vendors survive while stale vendors age out

pub mod errors;
pub mod provider;
pub mod providers;
pub mod traits;

pub use errors::{CacheError, CacheResult};
pub use provider::CacheProvider;
pub use providers::{NoOpCacheService, RedisCacheService};
pub use traits::CacheService;
