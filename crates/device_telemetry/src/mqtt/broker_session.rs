use crate::mqtt::{connect_params, telemetry_topic, BrokerTransport};
use common::domain::{
    ConnectError, Credential, EndpointSelector, Identity, PublishError, TelemetryMessage,
};
use tracing::{debug, info, instrument, warn};

/// Lifecycle of a single broker session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    ConnectFailed,
    Publishing,
    Published,
    PublishFailed,
    Disconnected,
}

impl SessionState {
    /// States after a connection attempt, where the transport may still hold resources
    fn may_hold_connection(self) -> bool {
        matches!(
            self,
            SessionState::Connecting
                | SessionState::ConnectFailed
                | SessionState::Connected
                | SessionState::Publishing
                | SessionState::Published
                | SessionState::PublishFailed
        )
    }
}

/// Owns one short-lived broker connection: connect once, publish at most once, disconnect.
///
/// Failures never escape as errors. Each operation reports success as a bool
/// and keeps the diagnostic retrievable through `last_connection_error` and
/// `last_publish_error`.
pub struct BrokerSession {
    transport: Box<dyn BrokerTransport>,
    state: SessionState,
    last_connection_error: Option<String>,
    last_publish_error: Option<String>,
}

impl BrokerSession {
    pub fn new(transport: Box<dyn BrokerTransport>) -> Self {
        Self {
            transport,
            state: SessionState::Idle,
            last_connection_error: None,
            last_publish_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    #[instrument(skip_all, fields(device_id = %identity.device_id, endpoint = %endpoint))]
    pub async fn connect(
        &mut self,
        endpoint: &EndpointSelector,
        identity: &Identity,
        credential: &Credential,
    ) -> bool {
        if self.state != SessionState::Idle {
            let err = match self.state {
                SessionState::Disconnected => ConnectError::SessionClosed,
                state => ConnectError::AlreadyConnected(format!("{:?}", state)),
            };
            warn!(error = %err, "connect called outside the idle state");
            self.last_connection_error = Some(err.to_string());
            return false;
        }

        let params = match connect_params(endpoint, identity, credential) {
            Ok(params) => params,
            Err(e) => {
                self.fail_connect(e);
                return false;
            }
        };

        self.state = SessionState::Connecting;
        match self.transport.connect(&params).await {
            Ok(()) => {
                info!("connected to MQTT broker");
                self.state = SessionState::Connected;
                true
            }
            Err(e) => {
                self.fail_connect(e);
                false
            }
        }
    }

    /// Publish the message on its device's event topic. Valid only once, from `Connected`.
    #[instrument(skip_all, fields(device_id = %message.device_id))]
    pub async fn publish(&mut self, message: &TelemetryMessage) -> bool {
        match self.state {
            SessionState::Connected => {}
            SessionState::Published | SessionState::PublishFailed => {
                self.record_publish_error(PublishError::AlreadyAttempted);
                return false;
            }
            _ => {
                self.record_publish_error(PublishError::NotConnected);
                return false;
            }
        }

        self.state = SessionState::Publishing;
        let result = match message.to_payload() {
            Ok(payload) => {
                self.transport
                    .publish(&telemetry_topic(&message.device_id), payload)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!("published telemetry message");
                self.state = SessionState::Published;
                true
            }
            Err(e) => {
                self.record_publish_error(e);
                self.state = SessionState::PublishFailed;
                false
            }
        }
    }

    /// Release the connection. Safe from every state and idempotent.
    pub async fn disconnect(&mut self) {
        if self.state.may_hold_connection() {
            self.transport.disconnect().await;
            debug!(previous_state = ?self.state, "broker session disconnected");
        }
        self.state = SessionState::Disconnected;
    }

    pub fn last_connection_error(&self) -> Option<&str> {
        self.last_connection_error.as_deref()
    }

    pub fn last_publish_error(&self) -> Option<&str> {
        self.last_publish_error.as_deref()
    }

    fn fail_connect(&mut self, err: ConnectError) {
        warn!(error = %err, "MQTT connection failed");
        self.last_connection_error = Some(err.to_string());
        self.state = SessionState::ConnectFailed;
    }

    fn record_publish_error(&mut self, err: PublishError) {
        warn!(error = %err, "MQTT publish failed");
        self.last_publish_error = Some(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mqtt::MockBrokerTransport;
    use chrono::{Duration, Utc};

    fn identity() -> Identity {
        Identity {
            device_id: "scanner-01".to_string(),
            project_id: "fleet-project".to_string(),
            registry_id: "warehouse".to_string(),
            cloud_region: "us-central1".to_string(),
            algorithm: "RS256".to_string(),
            private_key_reference: "rsa_private.pem".to_string(),
        }
    }

    fn credential() -> Credential {
        let now = Utc::now();
        Credential::new("signed-token".to_string(), now, now + Duration::minutes(20))
    }

    fn message() -> TelemetryMessage {
        TelemetryMessage {
            device_id: "scanner-01".to_string(),
            model: "TC52".to_string(),
            latitude: "37.4219999".to_string(),
            longitude: "-122.0840575".to_string(),
            battery_level: 80,
            battery_health: 95,
            os_version: "8.1.0".to_string(),
            patch_level: "2019-02-01".to_string(),
            release_version: "01-13-20.00-OG-U00-STD".to_string(),
        }
    }

    fn broker() -> EndpointSelector {
        EndpointSelector::Broker {
            url: "mqtt://localhost:1883".to_string(),
        }
    }

    #[tokio::test]
    async fn test_connect_publish_disconnect() {
        let mut transport = MockBrokerTransport::new();
        transport
            .expect_connect()
            .withf(|params| params.password == "signed-token" && params.port == 1883)
            .times(1)
            .returning(|_| Ok(()));
        transport
            .expect_publish()
            .withf(|topic, payload| topic == "/devices/scanner-01/events" && !payload.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));
        transport.expect_disconnect().times(1).returning(|| ());

        let mut session = BrokerSession::new(Box::new(transport));
        assert!(session.connect(&broker(), &identity(), &credential()).await);
        assert_eq!(session.state(), SessionState::Connected);

        assert!(session.publish(&message()).await);
        assert_eq!(session.state(), SessionState::Published);

        session.disconnect().await;
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(session.last_connection_error(), None);
        assert_eq!(session.last_publish_error(), None);
    }

    #[tokio::test]
    async fn test_connect_failure_records_error() {
        let mut transport = MockBrokerTransport::new();
        transport
            .expect_connect()
            .times(1)
            .returning(|_| Err(ConnectError::Rejected("AUTH_REJECTED".to_string())));
        transport.expect_disconnect().times(1).returning(|| ());

        let mut session = BrokerSession::new(Box::new(transport));
        assert!(!session.connect(&broker(), &identity(), &credential()).await);
        assert_eq!(session.state(), SessionState::ConnectFailed);
        assert_eq!(session.last_connection_error(), Some("AUTH_REJECTED"));

        session.disconnect().await;
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_never_reaches_transport() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().times(0);

        let mut session = BrokerSession::new(Box::new(transport));
        let endpoint = EndpointSelector::Broker {
            url: "mqtt://host:port".to_string(),
        };
        assert!(!session.connect(&endpoint, &identity(), &credential()).await);
        assert_eq!(session.state(), SessionState::ConnectFailed);
        assert!(session
            .last_connection_error()
            .unwrap()
            .starts_with("Invalid broker endpoint"));
    }

    #[tokio::test]
    async fn test_publish_requires_connection() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_publish().times(0);

        let mut session = BrokerSession::new(Box::new(transport));
        assert!(!session.publish(&message()).await);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.last_publish_error(), Some("Not connected to broker"));
    }

    #[tokio::test]
    async fn test_publish_failure_records_error() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().returning(|_| Ok(()));
        transport
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(PublishError::Rejected("QUOTA_EXCEEDED".to_string())));
        transport.expect_disconnect().times(1).returning(|| ());

        let mut session = BrokerSession::new(Box::new(transport));
        assert!(session.connect(&broker(), &identity(), &credential()).await);
        assert!(!session.publish(&message()).await);
        assert_eq!(session.state(), SessionState::PublishFailed);
        assert_eq!(session.last_publish_error(), Some("QUOTA_EXCEEDED"));

        session.disconnect().await;
    }

    #[tokio::test]
    async fn test_single_publish_attempt_per_session() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().returning(|_| Ok(()));
        transport.expect_publish().times(1).returning(|_, _| Ok(()));
        transport.expect_disconnect().returning(|| ());

        let mut session = BrokerSession::new(Box::new(transport));
        assert!(session.connect(&broker(), &identity(), &credential()).await);
        assert!(session.publish(&message()).await);
        assert!(!session.publish(&message()).await);
        assert_eq!(
            session.last_publish_error(),
            Some("Publish already attempted in this session")
        );
        assert_eq!(session.state(), SessionState::Published);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().returning(|_| Ok(()));
        transport.expect_disconnect().times(1).returning(|| ());

        let mut session = BrokerSession::new(Box::new(transport));
        assert!(session.connect(&broker(), &identity(), &credential()).await);

        session.disconnect().await;
        session.disconnect().await;
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_from_idle_is_noop() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_disconnect().times(0);

        let mut session = BrokerSession::new(Box::new(transport));
        session.disconnect().await;
        session.disconnect().await;
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_second_connect_reports_session_state() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().times(1).returning(|_| Ok(()));
        transport.expect_disconnect().returning(|| ());

        let mut session = BrokerSession::new(Box::new(transport));
        assert!(session.connect(&broker(), &identity(), &credential()).await);
        assert!(!session.connect(&broker(), &identity(), &credential()).await);
        assert_eq!(
            session.last_connection_error(),
            Some("Broker session already in state Connected")
        );
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_connect_after_disconnect_is_rejected() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().times(0);

        let mut session = BrokerSession::new(Box::new(transport));
        session.disconnect().await;
        assert!(!session.connect(&broker(), &identity(), &credential()).await);
        assert_eq!(
            session.last_connection_error(),
            Some("Broker session already closed")
        );
        assert_eq!(session.state(), SessionState::Disconnected);
    }
}
