//! # Event Ingestion
//!
//! Consumes domain events from the platform's namespace queue and turns
//! pick events into learn jobs.
//!
//! - [`types`] - domain event envelope and pick payload
//! - [`listener`] - validates pick events and enqueues learn jobs
//! - [`consumer`] - polling loop feeding events to the listener

pub mod consumer;
pub mod listener;
pub mod types;

pub use consumer::{EventConsumer, EventConsumerStats};
pub use listener::{HandleOutcome, PickEventListener};
pub use types::{DomainEvent, PickedEventPayload};
