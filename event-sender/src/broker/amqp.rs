//! lapin-backed implementation of the broker capability traits.

use async_trait::async_trait;
use lapin::{
    options::{
        BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions, QueueBindOptions,
        QueueDeclareOptions,
    },
    publisher_confirm::Confirmation,
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind,
};
use tracing::info;

use super::{
    BrokerChannel, BrokerConnection, Connector, ExchangeOptions, Outgoing, QueueOptions,
};
use crate::config::Config;
use crate::error::{SendError, TopologyStep};

/// Name the connection is registered under on the broker.
pub const CONNECTION_NAME: &str = "send-broker-event";

const REPLY_SUCCESS: u16 = 200;

/// Connects to RabbitMQ over AMQP 0-9-1.
#[derive(Debug, Default, Clone, Copy)]
pub struct AmqpConnector;

impl AmqpConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for AmqpConnector {
    type Connection = AmqpConnection;

    async fn connect(&self, config: &Config) -> Result<AmqpConnection, SendError> {
        let uri = config
            .amqp_uri()
            .map_err(|e| SendError::Connection(Box::new(e)))?;

        info!(
            host = %config.rabbit_host,
            port = config.rabbit_port,
            vhost = %config.rabbit_vhost,
            "rabbitmq_connecting"
        );

        let properties =
            ConnectionProperties::default().with_connection_name(CONNECTION_NAME.into());

        let conn = Connection::connect(&uri, properties)
            .await
            .map_err(|e| SendError::Connection(Box::new(e)))?;

        info!("rabbitmq_connected");

        Ok(AmqpConnection { conn })
    }
}

/// An open lapin connection.
pub struct AmqpConnection {
    conn: Connection,
}

#[async_trait]
impl BrokerConnection for AmqpConnection {
    type Channel = AmqpChannel;

    async fn create_channel(&self) -> Result<AmqpChannel, SendError> {
        let channel = self
            .conn
            .create_channel()
            .await
            .map_err(|e| SendError::Channel(Box::new(e)))?;

        // Publishes are only reported as sent once the broker acks them
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| SendError::Channel(Box::new(e)))?;

        info!(channel_id = channel.id(), "rabbitmq_channel_created");

        Ok(AmqpChannel { channel })
    }

    async fn close(&self) -> Result<(), SendError> {
        self.conn
            .close(REPLY_SUCCESS, "Normal shutdown")
            .await
            .map_err(|e| SendError::Connection(Box::new(e)))
    }
}

/// An open lapin channel in publisher-confirm mode.
pub struct AmqpChannel {
    channel: Channel,
}

#[async_trait]
impl BrokerChannel for AmqpChannel {
    async fn declare_exchange(
        &self,
        name: &str,
        options: ExchangeOptions,
    ) -> Result<(), SendError> {
        self.channel
            .exchange_declare(
                name,
                ExchangeKind::Direct,
                ExchangeDeclareOptions {
                    durable: options.durable,
                    auto_delete: options.auto_delete,
                    internal: options.internal,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| SendError::topology(TopologyStep::DeclareExchange, e))
    }

    async fn declare_queue(&self, name: &str, options: QueueOptions) -> Result<String, SendError> {
        let queue = self
            .channel
            .queue_declare(
                name,
                QueueDeclareOptions {
                    durable: options.durable,
                    auto_delete: options.auto_delete,
                    exclusive: options.exclusive,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| SendError::topology(TopologyStep::DeclareQueue, e))?;

        Ok(queue.name().as_str().to_string())
    }

    async fn bind_queue(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), SendError> {
        self.channel
            .queue_bind(
                queue,
                exchange,
                routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| SendError::topology(TopologyStep::BindQueue, e))
    }

    async fn publish(&self, message: Outgoing<'_>) -> Result<(), SendError> {
        let confirmation = self
            .channel
            .basic_publish(
                message.exchange,
                message.routing_key,
                BasicPublishOptions {
                    mandatory: false,
                    immediate: false,
                },
                message.body,
                BasicProperties::default().with_content_type(message.content_type.into()),
            )
            .await
            .map_err(|e| SendError::Publish(Box::new(e)))?
            .await
            .map_err(|e| SendError::Publish(Box::new(e)))?;

        match confirmation {
            Confirmation::Nack(_) => Err(SendError::Publish("message nacked by broker".into())),
            Confirmation::Ack(_) | Confirmation::NotRequested => Ok(()),
        }
    }

    async fn close(&self) -> Result<(), SendError> {
        self.channel
            .close(REPLY_SUCCESS, "Normal shutdown")
            .await
            .map_err(|e| SendError::Channel(Box::new(e)))
    }
}
