//! In-memory broker used by the workflow tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{
    BrokerChannel, BrokerConnection, Connector, ExchangeOptions, Outgoing, QueueOptions,
};
use crate::config::Config;
use crate::error::{SendError, TopologyStep};

/// A broker call, recorded in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    CreateChannel,
    DeclareExchange {
        name: String,
        options: ExchangeOptions,
    },
    DeclareQueue {
        name: String,
        options: QueueOptions,
    },
    BindQueue {
        queue: String,
        exchange: String,
        routing_key: String,
    },
    Publish {
        exchange: String,
        routing_key: String,
        content_type: String,
        body: Vec<u8>,
    },
    CloseChannel,
    CloseConnection,
}

/// Where the fake broker should misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fault {
    #[default]
    None,
    Connect,
    CreateChannel,
    DeclareExchange,
    DeclareQueue,
    BindQueue,
    Publish,
    /// The publish never completes.
    PublishHang,
    /// Publish and both closes never complete, as under broker flow control.
    Stalled,
}

/// Configuration pointing at a local broker.
pub fn config() -> Config {
    Config {
        rabbit_host: "localhost".to_string(),
        rabbit_port: 5672,
        rabbit_user: "guest".to_string(),
        rabbit_pass: "guest".to_string(),
        rabbit_vhost: "/".to_string(),
        rabbit_exchange: "central".to_string(),
        rabbit_exchange_key: "notify".to_string(),
        rabbit_queue: "central_events".to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeBroker {
    fault: Fault,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(fault: Fault) -> Self {
        Self {
            fault,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| call(c)).count()
    }

    /// Names of the recorded calls, for asserting ordering.
    pub fn trace(&self) -> Vec<&'static str> {
        self.calls()
            .iter()
            .map(|c| match c {
                Call::Connect => "connect",
                Call::CreateChannel => "create_channel",
                Call::DeclareExchange { .. } => "declare_exchange",
                Call::DeclareQueue { .. } => "declare_queue",
                Call::BindQueue { .. } => "bind_queue",
                Call::Publish { .. } => "publish",
                Call::CloseChannel => "close_channel",
                Call::CloseConnection => "close_connection",
            })
            .collect()
    }

    /// Bodies of every publish call.
    pub fn published(&self) -> Vec<Vec<u8>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Publish { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    async fn stall_if_stalled(&self) {
        if self.fault == Fault::Stalled {
            std::future::pending::<()>().await;
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Connector for FakeBroker {
    type Connection = FakeBroker;

    async fn connect(&self, _config: &Config) -> Result<FakeBroker, SendError> {
        self.record(Call::Connect);
        if self.fault == Fault::Connect {
            return Err(SendError::Connection("connection refused".into()));
        }
        Ok(self.clone())
    }
}

#[async_trait]
impl BrokerConnection for FakeBroker {
    type Channel = FakeBroker;

    async fn create_channel(&self) -> Result<FakeBroker, SendError> {
        self.record(Call::CreateChannel);
        if self.fault == Fault::CreateChannel {
            return Err(SendError::Channel("channel_max reached".into()));
        }
        Ok(self.clone())
    }

    async fn close(&self) -> Result<(), SendError> {
        self.record(Call::CloseConnection);
        self.stall_if_stalled().await;
        Ok(())
    }
}

#[async_trait]
impl BrokerChannel for FakeBroker {
    async fn declare_exchange(
        &self,
        name: &str,
        options: ExchangeOptions,
    ) -> Result<(), SendError> {
        self.record(Call::DeclareExchange {
            name: name.to_string(),
            options,
        });
        if self.fault == Fault::DeclareExchange {
            return Err(SendError::topology(
                TopologyStep::DeclareExchange,
                "PRECONDITION_FAILED - inequivalent arg 'type' for exchange",
            ));
        }
        Ok(())
    }

    async fn declare_queue(&self, name: &str, options: QueueOptions) -> Result<String, SendError> {
        self.record(Call::DeclareQueue {
            name: name.to_string(),
            options,
        });
        if self.fault == Fault::DeclareQueue {
            return Err(SendError::topology(
                TopologyStep::DeclareQueue,
                "PRECONDITION_FAILED - inequivalent arg 'durable' for queue",
            ));
        }
        Ok(name.to_string())
    }

    async fn bind_queue(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), SendError> {
        self.record(Call::BindQueue {
            queue: queue.to_string(),
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
        });
        if self.fault == Fault::BindQueue {
            return Err(SendError::topology(
                TopologyStep::BindQueue,
                "NOT_FOUND - no exchange",
            ));
        }
        Ok(())
    }

    async fn publish(&self, message: Outgoing<'_>) -> Result<(), SendError> {
        self.record(Call::Publish {
            exchange: message.exchange.to_string(),
            routing_key: message.routing_key.to_string(),
            content_type: message.content_type.to_string(),
            body: message.body.to_vec(),
        });
        match self.fault {
            Fault::Publish => Err(SendError::Publish("message nacked by broker".into())),
            Fault::PublishHang | Fault::Stalled => std::future::pending().await,
            _ => Ok(()),
        }
    }

    async fn close(&self) -> Result<(), SendError> {
        self.record(Call::CloseChannel);
        self.stall_if_stalled().await;
        Ok(())
    }
}
