//! Bounded publish of an encoded event envelope.

use std::time::Duration;

use tokio::time::timeout;
use tracing::info;

use super::types::CONTENT_TYPE_JSON;
use crate::broker::{BrokerChannel, Outgoing};
use crate::config::Config;
use crate::error::SendError;

/// Upper bound on a publish, measured from the moment it starts.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Publish `body` to the configured exchange under the routing key.
///
/// Fails with [`SendError::PublishTimeout`] if the broker has not accepted
/// the message within [`PUBLISH_TIMEOUT`]; the pending publish is dropped.
pub async fn publish<Ch>(channel: &Ch, config: &Config, body: &[u8]) -> Result<(), SendError>
where
    Ch: BrokerChannel + ?Sized,
{
    publish_within(channel, config, body, PUBLISH_TIMEOUT).await
}

/// Same as [`publish`] with an explicit bound.
pub async fn publish_within<Ch>(
    channel: &Ch,
    config: &Config,
    body: &[u8],
    limit: Duration,
) -> Result<(), SendError>
where
    Ch: BrokerChannel + ?Sized,
{
    let message = Outgoing {
        exchange: &config.rabbit_exchange,
        routing_key: &config.rabbit_exchange_key,
        content_type: CONTENT_TYPE_JSON,
        body,
    };

    timeout(limit, channel.publish(message))
        .await
        .map_err(|_| SendError::PublishTimeout(limit))??;

    info!(
        exchange = %config.rabbit_exchange,
        routing_key = %config.rabbit_exchange_key,
        body_length = body.len(),
        "rabbitmq_event_published"
    );

    Ok(())
}
