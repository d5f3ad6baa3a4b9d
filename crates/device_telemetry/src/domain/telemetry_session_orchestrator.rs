use crate::domain::SessionConfig;
use crate::location::LocationEnricher;
use crate::mqtt::{BrokerSession, BrokerTransportFactory};
use chrono::{Local, Utc};
use common::auth::CredentialProvider;
use common::domain::{
    DeviceSnapshotSource, SessionOutcome, StatusObserver, TelemetryJobInput, TelemetryMessage,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const UNKNOWN_CONNECT_ERROR: &str = "MQTT connection failed";
const UNKNOWN_PUBLISH_ERROR: &str = "MQTT publish failed";

/// Runs one telemetry session per trigger: connect, enrich with location, publish, disconnect.
///
/// Every run reports exactly one terminal `SessionOutcome` to the status
/// observer, preceded by `Connected` when the broker accepted the session.
/// The broker session is always disconnected before `run_session` returns.
pub struct TelemetrySessionOrchestrator {
    credential_provider: Arc<dyn CredentialProvider>,
    transport_factory: Arc<dyn BrokerTransportFactory>,
    location_enricher: LocationEnricher,
    snapshot_source: Arc<dyn DeviceSnapshotSource>,
    status_observer: Arc<dyn StatusObserver>,
    config: SessionConfig,
}

impl TelemetrySessionOrchestrator {
    pub fn new(
        credential_provider: Arc<dyn CredentialProvider>,
        transport_factory: Arc<dyn BrokerTransportFactory>,
        location_enricher: LocationEnricher,
        snapshot_source: Arc<dyn DeviceSnapshotSource>,
        status_observer: Arc<dyn StatusObserver>,
        config: SessionConfig,
    ) -> Self {
        Self {
            credential_provider,
            transport_factory,
            location_enricher,
            snapshot_source,
            status_observer,
            config,
        }
    }

    #[instrument(skip_all, fields(endpoint = %input.endpoint, device_id = ?input.device_id))]
    pub async fn run_session(&self, input: &TelemetryJobInput) -> SessionOutcome {
        let mut session = BrokerSession::new(self.transport_factory.create());

        let outcome = self.drive(&mut session, input).await;
        self.status_observer.notify(&outcome);

        session.disconnect().await;
        debug!(outcome = %outcome, "telemetry session finished");
        outcome
    }

    async fn drive(&self, session: &mut BrokerSession, input: &TelemetryJobInput) -> SessionOutcome {
        let identity = match input.identity() {
            Ok(identity) => identity,
            Err(e) => {
                error!(error = %e, "invalid telemetry job input");
                return SessionOutcome::ConnectFailed(e.to_string());
            }
        };

        let snapshot = self.snapshot_source.snapshot();

        let credential = match self.credential_provider.issue(&identity) {
            Ok(credential) => credential,
            Err(e) => {
                error!(error = %e, "failed to issue broker credential");
                return SessionOutcome::ConnectFailed(e.to_string());
            }
        };

        if !session.connect(&input.endpoint, &identity, &credential).await {
            let reason = session
                .last_connection_error()
                .unwrap_or(UNKNOWN_CONNECT_ERROR)
                .to_string();
            return SessionOutcome::ConnectFailed(reason);
        }
        self.status_observer.notify(&SessionOutcome::Connected);

        let resolution = self
            .location_enricher
            .resolve_last_known()
            .wait(self.config.location_timeout())
            .await;
        let location = match resolution.into_sample() {
            Ok(location) => location,
            Err(e) => {
                warn!(error = %e, "location unavailable, skipping publish");
                return SessionOutcome::LocationUnavailable;
            }
        };
        if !location.is_known() {
            debug!("no position fix, publishing unknown location");
        }

        if credential.is_expired_at(Utc::now()) {
            warn!(
                expired_at = %credential.expires_at(),
                "broker credential expired while resolving location"
            );
        }

        let message = TelemetryMessage::build(&identity.device_id, &snapshot, &location);
        info!(
            latitude = %message.latitude,
            longitude = %message.longitude,
            battery_level = message.battery_level,
            "sending telemetry"
        );

        if session.publish(&message).await {
            SessionOutcome::Published(Local::now())
        } else {
            let reason = session
                .last_publish_error()
                .unwrap_or(UNKNOWN_PUBLISH_ERROR)
                .to_string();
            SessionOutcome::PublishFailed(reason)
        }
    }
}
