//! # Data Models
//!
//! Core types flowing through the learning pipeline:
//!
//! - [`picked_item`] - picked order items read from tenant schemas
//! - [`transition`] - zone-to-zone movements extracted from pick sequences
//! - [`cost_model`] - accumulated per-vendor travel cost statistics

pub mod cost_model;
pub mod picked_item;
pub mod transition;

pub use cost_model::{CostModel, EdgeCost};
pub use picked_item::PickedItem;
pub use transition::{extract_transitions, Transition};
