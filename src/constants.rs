//! # System Constants
//!
//! Names, bounds, and cache parameters that define the operational
//! boundaries of the pickwalk cost-learning pipeline. These values are
//! shared contracts with the commerce platform that emits pick events
//! and with downstream consumers of the learned cost models.

/// Domain events consumed by this subsystem
pub mod events {
    /// Emitted when a single order line item has been picked
    pub const ORDER_ITEM_PICKED: &str = "order.item.picked";
}

/// Work queue naming
pub mod queues {
    /// Queue carrying deferred learning jobs, one per completed order/vendor
    pub const LEARN_QUEUE: &str = "pickwalk_learn";

    /// Job name used when enqueueing learn jobs, for tracing
    pub const LEARN_JOB: &str = "learn";

    /// Default namespace for the inbound domain-events queue
    /// (`{namespace}_domain_events`)
    pub const DEFAULT_EVENT_NAMESPACE: &str = "ecom";
}

/// Transition filtering bounds
pub mod transitions {
    /// Maximum elapsed seconds between two consecutive picks for the
    /// transition to count as a walking cost. Longer gaps are treated as
    /// idle time or timestamp anomalies and discarded.
    pub const MAX_TRANSITION_SECONDS: f64 = 300.0;
}

/// Cost model cache parameters
pub mod cache {
    /// Versioned key prefix for per-vendor cost models
    pub const COST_KEY_PREFIX: &str = "pickwalk:costs:v1";

    /// Sliding expiry for cost models, re-armed on every write.
    /// Models of inactive vendors age out after 90 days.
    pub const COST_MODEL_TTL_SECONDS: u64 = 60 * 60 * 24 * 90;
}

/// Tenant schema conventions
pub mod schema {
    /// Prefix for tenant-scoped schema names
    pub const TENANT_SCHEMA_PREFIX: &str = "tenant_";

    /// Zone label for items whose category has no resolvable zone
    pub const UNASSIGNED_ZONE: &str = "unassigned";

    /// Zone label used when the tenant schema has no zone concept at all
    pub const DEFAULT_ZONE: &str = "default";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_model_ttl_is_ninety_days() {
        assert_eq!(cache::COST_MODEL_TTL_SECONDS, 7_776_000);
    }

    #[test]
    fn test_transition_ceiling() {
        assert_eq!(transitions::MAX_TRANSITION_SECONDS, 300.0);
    }
}
