//! Broker capability interface.
//!
//! The send workflow only needs a handful of broker primitives: connect,
//! open a channel, declare, bind, publish and close. They are expressed as
//! traits so the workflow runs unchanged against lapin ([`amqp`]) or an
//! in-memory fake in tests.
//!
//! ```text
//! Connector → BrokerConnection → BrokerChannel
//! ```

pub mod amqp;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::SendError;

pub use amqp::AmqpConnector;

/// Flags for a direct exchange declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeOptions {
    pub durable: bool,
    pub auto_delete: bool,
    pub internal: bool,
}

/// Flags for a queue declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueOptions {
    pub durable: bool,
    pub auto_delete: bool,
    pub exclusive: bool,
}

/// A message ready to be published.
#[derive(Debug, Clone, Copy)]
pub struct Outgoing<'a> {
    pub exchange: &'a str,
    pub routing_key: &'a str,
    pub content_type: &'a str,
    pub body: &'a [u8],
}

/// Opens connections to a broker.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: BrokerConnection;

    /// Connect and authenticate, failing with [`SendError::Connection`].
    async fn connect(&self, config: &Config) -> Result<Self::Connection, SendError>;
}

/// A live broker connection.
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    type Channel: BrokerChannel;

    /// Open a channel, failing with [`SendError::Channel`].
    async fn create_channel(&self) -> Result<Self::Channel, SendError>;

    /// Close the connection. Called once per connection.
    async fn close(&self) -> Result<(), SendError>;
}

/// A channel on a live connection.
///
/// All declarations wait for the broker's reply before returning.
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    /// Declare a direct exchange.
    async fn declare_exchange(&self, name: &str, options: ExchangeOptions)
        -> Result<(), SendError>;

    /// Declare a queue and return the name confirmed by the broker.
    async fn declare_queue(&self, name: &str, options: QueueOptions) -> Result<String, SendError>;

    async fn bind_queue(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), SendError>;

    /// Publish a message and wait until the broker accepts it.
    ///
    /// Callers bound this with a timeout; implementations must be
    /// cancel-safe with respect to dropping the returned future.
    async fn publish(&self, message: Outgoing<'_>) -> Result<(), SendError>;

    /// Close the channel. Called once per channel.
    async fn close(&self) -> Result<(), SendError>;
}
