//! The send workflow: connect, open a channel, declare, publish, close.
//!
//! ```text
//! args → event_name() → EventEnvelope → send_notification() → broker
//! ```
//!
//! Every resource acquired here is closed before returning, on success and
//! on every failure path.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::broker::{BrokerChannel, BrokerConnection, Connector};
use crate::config::{Config, ConfigError};
use crate::error::SendError;
use crate::queue::{publisher, topology, EventEnvelope};

/// Upper bound on waiting for the broker to confirm a channel or connection
/// close.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Entry point: validate arguments, load configuration, send once.
///
/// Arguments are checked before configuration is loaded or the broker is
/// touched.
pub async fn run<C, I, F>(connector: &C, args: I, load_config: F) -> Result<(), SendError>
where
    C: Connector,
    I: IntoIterator<Item = String>,
    F: FnOnce() -> Result<Config, ConfigError>,
{
    let event = event_name(args)?;

    let config = load_config()?;
    info!(
        host = %config.rabbit_host,
        port = config.rabbit_port,
        vhost = %config.rabbit_vhost,
        exchange = %config.rabbit_exchange,
        routing_key = %config.rabbit_exchange_key,
        queue = %config.rabbit_queue,
        "config_loaded"
    );

    send_event(connector, &config, &event).await
}

/// Extract the event name from the process arguments (program name first).
pub fn event_name<I>(args: I) -> Result<String, SendError>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter().nth(1).ok_or(SendError::MissingArgument)
}

/// Build the envelope for `event` and publish it once.
pub async fn send_event<C>(connector: &C, config: &Config, event: &str) -> Result<(), SendError>
where
    C: Connector,
{
    let body = EventEnvelope::notify(event).to_body()?;
    send_notification(connector, config, &body).await?;

    info!(
        event = %event,
        exchange = %config.rabbit_exchange,
        routing_key = %config.rabbit_exchange_key,
        "Sent notify"
    );

    Ok(())
}

/// Publish `body` over a fresh connection.
///
/// The connection is closed exactly once whether or not the inner steps
/// succeed. A close that fails or outlasts [`CLOSE_TIMEOUT`] is logged and
/// does not replace the result.
pub async fn send_notification<C>(
    connector: &C,
    config: &Config,
    body: &[u8],
) -> Result<(), SendError>
where
    C: Connector,
{
    let conn = connector.connect(config).await?;

    let result = with_connection(&conn, config, body).await;

    match timeout(CLOSE_TIMEOUT, conn.close()).await {
        Ok(Ok(())) => info!("rabbitmq_connection_closed"),
        Ok(Err(e)) => warn!(error = %e, "rabbitmq_connection_close_error"),
        Err(_) => warn!(timeout = ?CLOSE_TIMEOUT, "rabbitmq_connection_close_timeout"),
    }

    result
}

async fn with_connection<Conn>(conn: &Conn, config: &Config, body: &[u8]) -> Result<(), SendError>
where
    Conn: BrokerConnection,
{
    let channel = conn.create_channel().await?;

    let result = with_channel(&channel, config, body).await;

    match timeout(CLOSE_TIMEOUT, channel.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "rabbitmq_channel_close_error"),
        Err(_) => warn!(timeout = ?CLOSE_TIMEOUT, "rabbitmq_channel_close_timeout"),
    }

    result
}

async fn with_channel<Ch>(channel: &Ch, config: &Config, body: &[u8]) -> Result<(), SendError>
where
    Ch: BrokerChannel,
{
    topology::declare(channel, config).await?;
    publisher::publish(channel, config, body).await
}
