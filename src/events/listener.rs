//! Pick event listener
//!
//! Validates `order.item.picked` events and enqueues learn jobs. Invalid
//! events are dropped with a warning and never stop the consumer; only
//! queue failures surface as errors so the message can be redelivered.

use crate::constants::events::ORDER_ITEM_PICKED;
use crate::error::Result;
use crate::events::types::{DomainEvent, PickedEventPayload};
use crate::messaging::LearnQueue;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the listener did with one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Event name is not `order.item.picked`
    Ignored,
    /// Payload was malformed or incomplete; no job was created
    Dropped,
    /// Learn job enqueued with this queue message id
    Enqueued(i64),
}

/// Listener turning pick events into learn jobs
#[derive(Clone)]
pub struct PickEventListener {
    queue: Arc<dyn LearnQueue>,
}

impl PickEventListener {
    pub fn new(queue: Arc<dyn LearnQueue>) -> Self {
        Self { queue }
    }

    /// Handle one domain event
    ///
    /// Returns `Err` only when enqueueing fails; every payload problem
    /// resolves to `Dropped` so poison events cannot wedge the queue.
    pub async fn handle_event(&self, event: &DomainEvent) -> Result<HandleOutcome> {
        if event.event_name != ORDER_ITEM_PICKED {
            debug!(
                event_id = %event.event_id,
                event_name = %event.event_name,
                "Ignoring non-pick event"
            );
            return Ok(HandleOutcome::Ignored);
        }

        let payload: PickedEventPayload = match serde_json::from_value(event.payload.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    event_id = %event.event_id,
                    correlation_id = ?event.correlation_id,
                    error = %e,
                    "Dropping pick event with malformed payload"
                );
                return Ok(HandleOutcome::Dropped);
            }
        };

        let Some(job) = payload.to_learn_job() else {
            warn!(
                event_id = %event.event_id,
                correlation_id = ?event.correlation_id,
                missing = ?payload.missing_fields(),
                "Dropping pick event with missing required fields"
            );
            return Ok(HandleOutcome::Dropped);
        };

        let message_id = self.queue.enqueue_learn_job(&job).await?;

        info!(
            event_id = %event.event_id,
            correlation_id = ?event.correlation_id,
            order_id = %job.order_id,
            tenant_id = %job.tenant_id,
            vendor_record_id = %job.vendor_record_id,
            message_id = message_id,
            "Pick event accepted"
        );

        Ok(HandleOutcome::Enqueued(message_id))
    }
}

impl std::fmt::Debug for PickEventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickEventListener").finish()
    }
}
