use crate::mqtt::ConnectParams;
use async_trait::async_trait;
use common::domain::{ConnectError, PublishError};

/// Connect, publish and disconnect primitives of an MQTT client library.
///
/// One transport backs exactly one broker session and owns at most one
/// underlying connection.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BrokerTransport: Send {
    /// Open the connection and wait for the broker to accept it
    async fn connect(&mut self, params: &ConnectParams) -> Result<(), ConnectError>;

    /// Publish a single message and wait for the broker to take it
    async fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError>;

    /// Release the connection if one is held
    async fn disconnect(&mut self);
}

/// Creates a fresh transport for every session
pub trait BrokerTransportFactory: Send + Sync {
    fn create(&self) -> Box<dyn BrokerTransport>;
}

impl<F> BrokerTransportFactory for F
where
    F: Fn() -> Box<dyn BrokerTransport> + Send + Sync,
{
    fn create(&self) -> Box<dyn BrokerTransport> {
        self()
    }
}
