//! Exchange and queue declaration.

use tracing::info;

use crate::broker::{BrokerChannel, ExchangeOptions, QueueOptions};
use crate::config::Config;
use crate::error::SendError;

/// Options for the event exchange: transient, not auto-deleted.
pub const EXCHANGE_OPTIONS: ExchangeOptions = ExchangeOptions {
    durable: false,
    auto_delete: false,
    internal: false,
};

/// Options for the event queue: durable, shared, kept when unused.
pub const QUEUE_OPTIONS: QueueOptions = QueueOptions {
    durable: true,
    auto_delete: false,
    exclusive: false,
};

/// Declare the exchange and queue and bind them with the routing key.
///
/// Each step waits for the broker's reply; the first failure aborts and is
/// returned as [`SendError::Topology`]. Returns the broker-confirmed queue
/// name.
pub async fn declare<Ch>(channel: &Ch, config: &Config) -> Result<String, SendError>
where
    Ch: BrokerChannel + ?Sized,
{
    channel
        .declare_exchange(&config.rabbit_exchange, EXCHANGE_OPTIONS)
        .await?;

    info!(exchange = %config.rabbit_exchange, kind = "direct", "rabbitmq_exchange_declared");

    let queue = channel
        .declare_queue(&config.rabbit_queue, QUEUE_OPTIONS)
        .await?;

    info!(queue = %queue, "rabbitmq_queue_declared");

    channel
        .bind_queue(&queue, &config.rabbit_exchange, &config.rabbit_exchange_key)
        .await?;

    info!(
        queue = %queue,
        exchange = %config.rabbit_exchange,
        routing_key = %config.rabbit_exchange_key,
        "rabbitmq_queue_bound"
    );

    Ok(queue)
}
