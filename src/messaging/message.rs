//! Wire format for deferred learning work.

use serde::{Deserialize, Serialize};

/// One unit of deferred learning work, created 1:1 from a valid pick event.
///
/// Serialized with camelCase field names; the payload shape is shared with
/// the commerce platform that originally enqueued these jobs, so it must
/// stay byte-compatible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnJob {
    /// Order whose picked items will be analyzed
    pub order_id: String,
    /// Tenant owning the order (selects the schema to query)
    pub tenant_id: String,
    /// Vendor whose cost model the transitions merge into
    pub vendor_record_id: String,
}

impl LearnJob {
    /// Create a new learn job
    pub fn new(
        order_id: impl Into<String>,
        tenant_id: impl Into<String>,
        vendor_record_id: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            tenant_id: tenant_id.into(),
            vendor_record_id: vendor_record_id.into(),
        }
    }
}
