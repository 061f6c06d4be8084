//! Queue module for RabbitMQ operations.
//!
//! This module provides:
//! - The event envelope published as the message body
//! - Topology declaration (direct exchange, durable queue, binding)
//! - The bounded publisher
//!
//! ## Topology
//!
//! ```text
//! send-broker-event → exchange (direct) → routing key → queue (durable)
//! ```

pub mod publisher;
pub mod topology;
pub mod types;

pub use publisher::PUBLISH_TIMEOUT;
pub use types::{EventEnvelope, CONTENT_TYPE_JSON, NOTIFY_ACTION};
