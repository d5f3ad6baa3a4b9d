mod config;
mod shutdown;

use anyhow::Context;
use common::auth::{JwtConfig, JwtCredentialProvider};
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig, TelemetryProviders};
use crate::config::ServiceConfig;
use device_telemetry::device::HostDeviceSnapshotSource;
use device_telemetry::domain::{
    PeriodicTrigger, TelemetrySessionOrchestrator, TracingStatusObserver,
};
use device_telemetry::location::{LocationEnricher, StaticLocationProvider};
use device_telemetry::mqtt::RumqttcTransportFactory;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry (tracing + OpenTelemetry for traces and logs)
    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
    }) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        endpoint = %config.endpoint,
        "starting telemetry worker"
    );
    debug!("Configuration: {:?}", config);

    let result = run(&config).await;
    shutdown_telemetry(telemetry_providers);

    if let Err(e) = result {
        error!("telemetry worker failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: &ServiceConfig) -> anyhow::Result<()> {
    let input = config.job_input();
    // Surface a misconfigured identity at startup; sessions still report it per run
    if let Err(e) = input.identity() {
        error!(error = %e, "telemetry job input is incomplete");
    }

    let session_config = config.session_config();
    let orchestrator = TelemetrySessionOrchestrator::new(
        Arc::new(JwtCredentialProvider::new(JwtConfig::new(
            config.jwt_expiration_minutes,
            None,
        ))),
        Arc::new(RumqttcTransportFactory::new(session_config.clone())),
        LocationEnricher::new(Arc::new(StaticLocationProvider::from_config(
            config.location_enabled,
            config.location_latitude,
            config.location_longitude,
        ))),
        Arc::new(HostDeviceSnapshotSource::new(config.device_model.clone())),
        Arc::new(TracingStatusObserver),
        session_config,
    );

    let shutdown_token = CancellationToken::new();
    shutdown::spawn_signal_listener(shutdown_token.clone());

    let trigger = PeriodicTrigger::new(config.publish_interval(), config.run_once);
    let worker = tokio::spawn(async move {
        trigger.run(&orchestrator, &input, shutdown_token).await
    });

    let sessions = worker.await.context("telemetry trigger task failed")?;
    info!(sessions, "telemetry worker stopped");
    Ok(())
}
