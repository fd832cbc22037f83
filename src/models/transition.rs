//! Zone transition extraction from pick sequences

use crate::models::picked_item::PickedItem;
use serde::{Deserialize, Serialize};

/// One observed movement between zones during a pickwalk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from_zone: String,
    pub to_zone: String,
    /// Elapsed pick-to-pick time, fractional seconds
    pub seconds: f64,
}

/// Extract bounded zone transitions from items ordered by pick timestamp
///
/// Each consecutive pair yields a candidate transition. A candidate is
/// kept only when its elapsed time is positive and at most `max_seconds`;
/// zero deltas (duplicate timestamps) and long gaps (breaks, shift
/// changes) carry no signal about walking cost and are dropped. Dropping
/// a candidate does not break the chain: the next pair is still
/// considered.
pub fn extract_transitions(items: &[PickedItem], max_seconds: f64) -> Vec<Transition> {
    let mut transitions = Vec::new();

    for pair in items.windows(2) {
        let seconds = pair[1]
            .picked_at
            .signed_duration_since(pair[0].picked_at)
            .num_milliseconds() as f64
            / 1000.0;

        if seconds > 0.0 && seconds <= max_seconds {
            transitions.push(Transition {
                from_zone: pair[0].zone_slug.clone(),
                to_zone: pair[1].zone_slug.clone(),
                seconds,
            });
        }
    }

    transitions
}
