//! Domain event envelope and pick event payload

use crate::messaging::LearnJob;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain event envelope as published on namespace event queues
///
/// Producers vary in how much of the envelope they fill in, so only the
/// event name is required. Unknown fields are ignored and a missing
/// event id is replaced with a fresh UUID v7 so every event can be
/// correlated in logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event identifier (UUID v7 for time-ordering)
    #[serde(default = "Uuid::now_v7")]
    pub event_id: Uuid,
    /// Event name in dot notation (e.g. "order.item.picked")
    pub event_name: String,
    /// Event payload as JSON
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Correlation id propagated from the producing service
    #[serde(default)]
    pub correlation_id: Option<Uuid>,
}

/// Payload of an `order.item.picked` event
///
/// All three ids are required to build a learn job. Producers sometimes
/// emit empty strings for absent values, so presence checks treat `""`
/// the same as a missing field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedEventPayload {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub vendor_record_id: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl PickedEventPayload {
    /// Names of required fields that are missing or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !present(&self.order_id) {
            missing.push("orderId");
        }
        if !present(&self.tenant_id) {
            missing.push("tenantId");
        }
        if !present(&self.vendor_record_id) {
            missing.push("vendorRecordId");
        }
        missing
    }

    /// Build a learn job when all required fields are present
    pub fn to_learn_job(&self) -> Option<LearnJob> {
        if !self.missing_fields().is_empty() {
            return None;
        }

        Some(LearnJob::new(
            self.order_id.as_deref()?,
            self.tenant_id.as_deref()?,
            self.vendor_record_id.as_deref()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_parses_with_full_fields() {
        let event: DomainEvent = serde_json::from_value(json!({
            "event_id": "01890a5d-ac96-774b-b9aa-a18a8c3a4b2f",
            "event_name": "order.item.picked",
            "payload": {"orderId": "o-1"},
            "correlation_id": "8f14e45f-ceea-467f-a348-e5cf02b1f0d4"
        }))
        .unwrap();

        assert_eq!(event.event_name, "order.item.picked");
        assert!(event.correlation_id.is_some());
    }

    #[test]
    fn test_envelope_defaults_missing_event_id() {
        let event: DomainEvent = serde_json::from_value(json!({
            "event_name": "order.item.picked",
            "payload": {}
        }))
        .unwrap();

        assert!(!event.event_id.is_nil());
        assert_eq!(event.correlation_id, None);
    }

    #[test]
    fn test_envelope_ignores_unknown_fields() {
        let event: DomainEvent = serde_json::from_value(json!({
            "event_name": "order.item.picked",
            "payload": {},
            "emitted_by": "warehouse-api",
            "schema_rev": 4
        }))
        .unwrap();

        assert_eq!(event.event_name, "order.item.picked");
    }

    #[test]
    fn test_complete_payload_builds_job() {
        let payload: PickedEventPayload = serde_json::from_value(json!({
            "orderId": "o-1",
            "tenantId": "t-1",
            "vendorRecordId": "v-1"
        }))
        .unwrap();

        assert!(payload.missing_fields().is_empty());
        let job = payload.to_learn_job().unwrap();
        assert_eq!(job.order_id, "o-1");
        assert_eq!(job.tenant_id, "t-1");
        assert_eq!(job.vendor_record_id, "v-1");
    }

    #[test]
    fn test_absent_field_is_reported_missing() {
        let payload: PickedEventPayload = serde_json::from_value(json!({
            "orderId": "o-1",
            "tenantId": "t-1"
        }))
        .unwrap();

        assert_eq!(payload.missing_fields(), vec!["vendorRecordId"]);
        assert!(payload.to_learn_job().is_none());
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let payload: PickedEventPayload = serde_json::from_value(json!({
            "orderId": "",
            "tenantId": "t-1",
            "vendorRecordId": "v-1"
        }))
        .unwrap();

        assert_eq!(payload.missing_fields(), vec!["orderId"]);
        assert!(payload.to_learn_job().is_none());
    }
}
