//! Per-vendor pickwalk cost models
//!
//! A cost model accumulates observed zone-to-zone travel times as
//! `{sum, count}` pairs keyed by `"{from}->{to}"`. Models are stored as
//! JSON under `pickwalk:costs:v1:<vendorRecordId>` and merged
//! read-modify-write on every learn job.

use crate::constants::cache::COST_KEY_PREFIX;
use crate::models::transition::Transition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Accumulated travel cost for one directed zone edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeCost {
    /// Total observed seconds across all merged transitions
    pub sum: f64,
    /// Number of merged transitions
    pub count: u64,
}

impl EdgeCost {
    /// Mean travel cost in seconds, `None` for an empty edge
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }
}

/// Learned travel costs for one vendor across all zone edges
///
/// Serializes transparently as the edge map itself, so the cached JSON
/// is exactly `{"A->B": {"sum": 40.0, "count": 1}, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostModel {
    edges: HashMap<String, EdgeCost>,
}

impl CostModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a vendor's model
    pub fn cache_key(vendor_record_id: &str) -> String {
        format!("{COST_KEY_PREFIX}:{vendor_record_id}")
    }

    /// Map key for a directed zone edge
    pub fn edge_key(from_zone: &str, to_zone: &str) -> String {
        format!("{from_zone}->{to_zone}")
    }

    /// Fold one observed transition into the model
    pub fn record(&mut self, transition: &Transition) {
        let entry = self
            .edges
            .entry(Self::edge_key(&transition.from_zone, &transition.to_zone))
            .or_insert(EdgeCost { sum: 0.0, count: 0 });
        entry.sum += transition.seconds;
        entry.count += 1;
    }

    /// Fold a batch of transitions into the model
    pub fn merge_transitions(&mut self, transitions: &[Transition]) {
        for transition in transitions {
            self.record(transition);
        }
    }

    /// Mean travel cost for a directed edge, `None` when unobserved
    pub fn mean_cost(&self, from_zone: &str, to_zone: &str) -> Option<f64> {
        self.edges
            .get(&Self::edge_key(from_zone, to_zone))
            .and_then(EdgeCost::mean)
    }

    /// Accumulated cost for a directed edge, `None` when unobserved
    pub fn edge(&self, from_zone: &str, to_zone: &str) -> Option<&EdgeCost> {
        self.edges.get(&Self::edge_key(from_zone, to_zone))
    }

    /// Number of distinct directed edges with observations
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterate all edges and their accumulated costs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EdgeCost)> {
        self.edges.iter().map(|(key, cost)| (key.as_str(), cost))
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Parse a model from its cached JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the model to its cached JSON form
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transition(from: &str, to: &str, seconds: f64) -> Transition {
        Transition {
            from_zone: from.to_string(),
            to_zone: to.to_string(),
            seconds,
        }
    }

    #[test]
    fn test_record_accumulates_sum_and_count() {
        let mut model = CostModel::new();
        model.record(&transition("A", "B", 40.0));
        model.record(&transition("A", "B", 20.0));

        let edge = model.edge("A", "B").unwrap();
        assert_eq!(edge.sum, 60.0);
        assert_eq!(edge.count, 2);
    }

    #[test]
    fn test_merging_same_batch_twice_doubles_totals() {
        let batch = vec![transition("A", "B", 40.0), transition("B", "C", 25.0)];

        let mut model = CostModel::new();
        model.merge_transitions(&batch);
        model.merge_transitions(&batch);

        let ab = model.edge("A", "B").unwrap();
        assert_eq!(ab.sum, 80.0);
        assert_eq!(ab.count, 2);
        let bc = model.edge("B", "C").unwrap();
        assert_eq!(bc.sum, 50.0);
        assert_eq!(bc.count, 2);
    }

    #[test]
    fn test_mean_cost() {
        let model: CostModel =
            serde_json::from_value(json!({"A->B": {"sum": 120.0, "count": 3}})).unwrap();

        assert_eq!(model.mean_cost("A", "B"), Some(40.0));
        assert_eq!(model.mean_cost("B", "A"), None);
    }

    #[test]
    fn test_mean_of_empty_edge_is_none() {
        let edge = EdgeCost { sum: 0.0, count: 0 };
        assert_eq!(edge.mean(), None);
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(CostModel::cache_key("vendor-7"), "pickwalk:costs:v1:vendor-7");
    }

    #[test]
    fn test_serializes_transparently_as_edge_map() {
        let mut model = CostModel::new();
        model.record(&transition("A", "B", 40.0));

        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value, json!({"A->B": {"sum": 40.0, "count": 1}}));
    }

    #[test]
    fn test_json_round_trip() {
        let mut model = CostModel::new();
        model.merge_transitions(&[
            transition("A", "B", 40.0),
            transition("B", "unassigned", 12.5),
        ]);

        let restored = CostModel::from_json(&model.to_json().unwrap()).unwrap();
        assert_eq!(restored, model);
    }

    #[test]
    fn test_new_model_is_empty() {
        let model = CostModel::new();
        assert!(model.is_empty());
        assert_eq!(model.edge_count(), 0);
        assert_eq!(model.mean_cost("A", "B"), None);
    }
}
