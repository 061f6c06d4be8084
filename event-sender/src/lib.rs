//! send-broker-event - One-shot RabbitMQ event notifier.
//!
//! Publishes a single `{"event": ..., "action": 1}` envelope to a direct
//! exchange and exits.
//!
//! ## Flow
//!
//! ```text
//! argv → Config → connect → channel → declare/bind → publish → close
//! ```

pub mod broker;
pub mod config;
pub mod error;
pub mod notify;
pub mod queue;

// Re-export commonly used types
pub use broker::{AmqpConnector, BrokerChannel, BrokerConnection, Connector};
pub use config::{Config, ConfigError};
pub use error::{SendError, TopologyStep};
pub use notify::{run, send_event, send_notification, CLOSE_TIMEOUT};
pub use queue::{EventEnvelope, PUBLISH_TIMEOUT};
