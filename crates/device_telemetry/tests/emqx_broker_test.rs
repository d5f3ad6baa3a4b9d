#![cfg(feature = "integration-tests")]

use common::auth::{JwtConfig, JwtCredentialProvider};
use common::domain::{
    DeviceSnapshot, DeviceSnapshotSource, EndpointSelector, SessionOutcome, TelemetryJobInput,
};
use device_telemetry::domain::{
    ChannelStatusObserver, SessionConfig, TelemetrySessionOrchestrator,
};
use device_telemetry::location::{LocationEnricher, StaticLocationProvider};
use device_telemetry::mqtt::RumqttcTransportFactory;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use testcontainers::core::WaitFor;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};
use tokio::sync::mpsc;

struct FixedSnapshotSource;

impl DeviceSnapshotSource for FixedSnapshotSource {
    fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            model: "TC52".to_string(),
            os_version: "8.1.0".to_string(),
            patch_level: "2019-02-01".to_string(),
            release_version: "01-13-20.00-OG-U00-STD".to_string(),
            battery_level_pct: 64.0,
            battery_health_pct: 90,
        }
    }
}

async fn start_emqx() -> (ContainerAsync<GenericImage>, String, u16) {
    let container = GenericImage::new("emqx/emqx", "5.8.0")
        .with_exposed_port(1883.into())
        .with_wait_for(WaitFor::message_on_stdout("is running now"))
        .start()
        .await
        .unwrap();

    let host = container.get_host().await.unwrap().to_string();
    let port = container.get_host_port_ipv4(1883).await.unwrap();
    (container, host, port)
}

/// Subscribe to the device event topic and forward every received payload
async fn subscribe(host: &str, port: u16, topic: &str) -> mpsc::UnboundedReceiver<Vec<u8>> {
    let mut options = MqttOptions::new("telemetry-test-subscriber", host, port);
    options.set_keep_alive(Duration::from_secs(30));
    let (client, mut eventloop) = AsyncClient::new(options, 10);
    client.subscribe(topic, QoS::AtLeastOnce).await.unwrap();

    let (subscribed_tx, subscribed_rx) = tokio::sync::oneshot::channel();
    let (payload_tx, payload_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let _client = client;
        let mut subscribed_tx = Some(subscribed_tx);
        while let Ok(event) = eventloop.poll().await {
            match event {
                Event::Incoming(Packet::SubAck(_)) => {
                    if let Some(tx) = subscribed_tx.take() {
                        let _ = tx.send(());
                    }
                }
                Event::Incoming(Packet::Publish(publish)) => {
                    let _ = payload_tx.send(publish.payload.to_vec());
                }
                _ => {}
            }
        }
    });

    tokio::time::timeout(Duration::from_secs(10), subscribed_rx)
        .await
        .unwrap()
        .unwrap();
    payload_rx
}

#[tokio::test]
async fn test_session_delivers_telemetry_to_broker() {
    let (_container, host, port) = start_emqx().await;
    let mut payloads = subscribe(&host, port, "/devices/scanner-01/events").await;

    let (observer, mut statuses) = ChannelStatusObserver::new();
    let config = SessionConfig::default();
    let orchestrator = TelemetrySessionOrchestrator::new(
        Arc::new(JwtCredentialProvider::new(JwtConfig::new(
            20,
            Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../common/tests/fixtures")),
        ))),
        Arc::new(RumqttcTransportFactory::new(config.clone())),
        LocationEnricher::new(Arc::new(StaticLocationProvider::from_config(
            true,
            Some(52.5200066),
            Some(13.404954),
        ))),
        Arc::new(FixedSnapshotSource),
        Arc::new(observer),
        config,
    );

    let input = TelemetryJobInput {
        endpoint: EndpointSelector::Broker {
            url: format!("mqtt://{}:{}", host, port),
        },
        device_id: Some("scanner-01".to_string()),
        project_id: "fleet-project".to_string(),
        registry_id: "warehouse".to_string(),
        private_key_reference: "ec_private.pem".to_string(),
        algorithm: "ES256".to_string(),
        cloud_region: "us-central1".to_string(),
    };

    let outcome = orchestrator.run_session(&input).await;
    assert!(
        matches!(outcome, SessionOutcome::Published(_)),
        "unexpected outcome: {outcome:?}"
    );
    assert_eq!(statuses.recv().await.unwrap(), "MQTT Connected");

    let payload = tokio::time::timeout(Duration::from_secs(10), payloads.recv())
        .await
        .unwrap()
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(body["deviceId"], "scanner-01");
    assert_eq!(body["latitude"], "52.5200066");
    assert_eq!(body["longitude"], "13.4049540");
    assert_eq!(body["batteryLevel"], 64);
}

#[tokio::test]
async fn test_unreachable_broker_reports_connect_failure() {
    let (observer, _statuses) = ChannelStatusObserver::new();
    let config = SessionConfig {
        connect_timeout_secs: 3,
        ..Default::default()
    };
    let orchestrator = TelemetrySessionOrchestrator::new(
        Arc::new(JwtCredentialProvider::new(JwtConfig::new(
            20,
            Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../common/tests/fixtures")),
        ))),
        Arc::new(RumqttcTransportFactory::new(config.clone())),
        LocationEnricher::new(Arc::new(StaticLocationProvider::from_config(true, None, None))),
        Arc::new(FixedSnapshotSource),
        Arc::new(observer),
        config,
    );

    let input = TelemetryJobInput {
        endpoint: EndpointSelector::Broker {
            url: "mqtt://127.0.0.1:1".to_string(),
        },
        device_id: Some("scanner-01".to_string()),
        project_id: String::new(),
        registry_id: String::new(),
        private_key_reference: "rsa_private.pem".to_string(),
        algorithm: "RS256".to_string(),
        cloud_region: String::new(),
    };

    let outcome = orchestrator.run_session(&input).await;
    assert!(matches!(outcome, SessionOutcome::ConnectFailed(_)));
}
