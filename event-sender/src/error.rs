//! Error types for the send workflow.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Underlying cause reported by the broker client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Topology declaration step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyStep {
    DeclareExchange,
    DeclareQueue,
    BindQueue,
}

impl fmt::Display for TopologyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TopologyStep::DeclareExchange => "Failed to declare an exchange",
            TopologyStep::DeclareQueue => "Failed to declare a queue",
            TopologyStep::BindQueue => "Failed to bind a queue",
        };
        f.write_str(label)
    }
}

/// Every way a send can fail. All of them are fatal for the invocation.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Missing arguments")]
    MissingArgument,

    #[error("Cannot load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to connect to RabbitMQ: {0}")]
    Connection(#[source] BoxError),

    #[error("Failed to open a channel: {0}")]
    Channel(#[source] BoxError),

    #[error("{step}: {source}")]
    Topology {
        step: TopologyStep,
        #[source]
        source: BoxError,
    },

    #[error("Failed to encode event envelope: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to publish a message: no acknowledgement within {0:?}")]
    PublishTimeout(Duration),

    #[error("Failed to publish a message: {0}")]
    Publish(#[source] BoxError),
}

impl SendError {
    /// Short label of the workflow step that failed, used as a log field.
    pub fn step(&self) -> &'static str {
        match self {
            SendError::MissingArgument => "arguments",
            SendError::Config(_) => "config",
            SendError::Connection(_) => "connect",
            SendError::Channel(_) => "channel",
            SendError::Topology { step, .. } => match step {
                TopologyStep::DeclareExchange => "exchange_declare",
                TopologyStep::DeclareQueue => "queue_declare",
                TopologyStep::BindQueue => "queue_bind",
            },
            SendError::Encode(_) => "encode",
            SendError::PublishTimeout(_) => "publish_timeout",
            SendError::Publish(_) => "publish",
        }
    }

    pub(crate) fn topology(step: TopologyStep, source: impl Into<BoxError>) -> Self {
        SendError::Topology {
            step,
            source: source.into(),
        }
    }
}
