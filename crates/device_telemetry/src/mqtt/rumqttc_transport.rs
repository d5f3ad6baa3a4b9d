use crate::domain::SessionConfig;
use crate::mqtt::{BrokerTransport, BrokerTransportFactory, ConnectParams};
use async_trait::async_trait;
use common::domain::{ConnectError, PublishError};
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Outgoing,
    Packet, QoS, Transport,
};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Request channel capacity; a session sends at most a publish and a disconnect
const REQUEST_CHANNEL_CAPACITY: usize = 10;

struct MqttConnection {
    client: AsyncClient,
    eventloop: EventLoop,
}

/// `BrokerTransport` backed by the rumqttc async client
pub struct RumqttcTransport {
    config: SessionConfig,
    connection: Option<MqttConnection>,
}

impl RumqttcTransport {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    fn mqtt_options(&self, params: &ConnectParams) -> MqttOptions {
        let mut mqtt_options = MqttOptions::new(&params.client_id, &params.host, params.port);
        mqtt_options.set_keep_alive(self.config.keep_alive());
        mqtt_options.set_clean_session(true);
        mqtt_options.set_credentials(&params.username, &params.password);
        if params.use_tls {
            mqtt_options.set_transport(Transport::tls_with_default_config());
        }
        mqtt_options
    }
}

#[async_trait]
impl BrokerTransport for RumqttcTransport {
    #[instrument(skip_all, fields(host = %params.host, port = params.port, client_id = %params.client_id))]
    async fn connect(&mut self, params: &ConnectParams) -> Result<(), ConnectError> {
        if self.connection.is_some() {
            warn!("transport already holds a connection, releasing it first");
            self.disconnect().await;
        }
        if params.client_id.trim().is_empty() {
            return Err(ConnectError::InvalidEndpoint(
                "MQTT client id cannot be empty".to_string(),
            ));
        }

        let (client, mut eventloop) =
            AsyncClient::new(self.mqtt_options(params), REQUEST_CHANNEL_CAPACITY);

        match timeout(self.config.connect_timeout(), wait_for_connack(&mut eventloop)).await {
            Ok(Ok(())) => {
                debug!("broker accepted connection");
                self.connection = Some(MqttConnection { client, eventloop });
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ConnectError::Timeout(self.config.connect_timeout_secs)),
        }
    }

    #[instrument(skip_all, fields(topic = %topic, payload_size = payload.len()))]
    async fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        let connection = self.connection.as_mut().ok_or(PublishError::NotConnected)?;

        connection
            .client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        match timeout(
            self.config.publish_timeout(),
            wait_for_puback(&mut connection.eventloop),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PublishError::Timeout(self.config.publish_timeout_secs)),
        }
    }

    async fn disconnect(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };

        if let Err(e) = connection.client.disconnect().await {
            warn!(error = %e, "failed to queue MQTT disconnect");
            return;
        }

        // Drive the event loop until the DISCONNECT packet has been written
        let flushed = timeout(self.config.disconnect_timeout(), async {
            loop {
                match connection.eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await;

        if flushed.is_err() {
            warn!("timed out flushing MQTT disconnect, dropping connection");
        } else {
            debug!("disconnected from broker");
        }
    }
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<(), ConnectError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                return match connack.code {
                    ConnectReturnCode::Success => Ok(()),
                    code => Err(ConnectError::Rejected(describe_return_code(code))),
                };
            }
            Ok(_) => {}
            Err(ConnectionError::ConnectionRefused(code)) => {
                return Err(ConnectError::Rejected(describe_return_code(code)));
            }
            Err(e) => return Err(ConnectError::Unreachable(e.to_string())),
        }
    }
}

async fn wait_for_puback(eventloop: &mut EventLoop) -> Result<(), PublishError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::PubAck(_))) => return Ok(()),
            Ok(Event::Incoming(Packet::Disconnect)) => {
                return Err(PublishError::Rejected(
                    "broker closed the connection".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(PublishError::Transport(e.to_string())),
        }
    }
}

fn describe_return_code(code: ConnectReturnCode) -> String {
    match code {
        ConnectReturnCode::BadUserNamePassword | ConnectReturnCode::NotAuthorized => {
            format!("authentication rejected ({:?})", code)
        }
        other => format!("{:?}", other),
    }
}

/// Creates a `RumqttcTransport` per session
pub struct RumqttcTransportFactory {
    config: SessionConfig,
}

impl RumqttcTransportFactory {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

impl BrokerTransportFactory for RumqttcTransportFactory {
    fn create(&self) -> Box<dyn BrokerTransport> {
        Box::new(RumqttcTransport::new(self.config.clone()))
    }
}
