//! # Messaging Module
//!
//! PostgreSQL message queue (pgmq) based messaging for the learning
//! pipeline. The pick event consumer and the cost learner both pull from
//! pgmq queues; the listener pushes learn jobs through the same client.

pub mod errors;
pub mod message;
pub mod pgmq_client;

pub use errors::{MessagingError, MessagingResult};
pub use message::LearnJob;
pub use pgmq_client::{LearnQueue, PgmqClient};
