//! send-broker-event - Publish one event notification to RabbitMQ.
//!
//! Usage: `send-broker-event <event-name>`
//!
//! Connection parameters come from `CENTRAL_*` environment variables,
//! optionally provided through a `.env` file in the working directory.

use std::env;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sendevent::{AmqpConnector, Config};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    match sendevent::run(&AmqpConnector::new(), env::args(), Config::load).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(step = e.step(), error = %e, "send_failed");
            ExitCode::FAILURE
        }
    }
}
