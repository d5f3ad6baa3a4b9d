use common::domain::{EndpointSelector, TelemetryJobInput};
use config::{Config, ConfigError, Environment};
use device_telemetry::domain::SessionConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // OpenTelemetry configuration
    /// Export traces and logs over OTLP
    #[serde(default)]
    pub otel_enabled: bool,

    /// OTLP gRPC collector endpoint
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    /// Service name reported to the collector
    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,

    // Broker and device identity
    /// `gcp` for Google Cloud IoT Core, otherwise a broker URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub device_id: Option<String>,

    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub registry_id: String,

    #[serde(default = "default_cloud_region")]
    pub cloud_region: String,

    /// JWT signing algorithm (RS256 or ES256)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// PEM private key matching `algorithm`
    #[serde(default = "default_private_key_path")]
    pub private_key_path: String,

    /// JWT lifetime in minutes (default: 20)
    #[serde(default = "default_jwt_expiration_minutes")]
    pub jwt_expiration_minutes: u64,

    // Session timing
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,

    /// Bound on the location wait, 0 waits for the provider
    #[serde(default = "default_location_timeout_secs")]
    pub location_timeout_secs: u64,

    /// Seconds between sessions (default: 900)
    #[serde(default = "default_publish_interval_secs")]
    pub publish_interval_secs: u64,

    /// Run a single session and exit
    #[serde(default)]
    pub run_once: bool,

    /// Reported device model, the host name when unset
    #[serde(default)]
    pub device_model: Option<String>,

    // Location
    /// Whether the worker may report its position
    #[serde(default = "default_location_enabled")]
    pub location_enabled: bool,

    #[serde(default)]
    pub location_latitude: Option<f64>,

    #[serde(default)]
    pub location_longitude: Option<f64>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "telemetry-worker".to_string()
}

fn default_endpoint() -> String {
    "gcp".to_string()
}

fn default_cloud_region() -> String {
    "us-central1".to_string()
}

fn default_algorithm() -> String {
    "RS256".to_string()
}

fn default_private_key_path() -> String {
    "rsa_private.pem".to_string()
}

fn default_jwt_expiration_minutes() -> u64 {
    20
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_publish_timeout_secs() -> u64 {
    10
}

fn default_location_timeout_secs() -> u64 {
    10
}

fn default_publish_interval_secs() -> u64 {
    900
}

fn default_location_enabled() -> bool {
    true
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("TELEMETRY"))
            .build()?
            .try_deserialize()
    }

    /// Input record handed to every triggered session
    pub fn job_input(&self) -> TelemetryJobInput {
        TelemetryJobInput {
            endpoint: EndpointSelector::parse(&self.endpoint),
            device_id: self.device_id.clone(),
            project_id: self.project_id.clone(),
            registry_id: self.registry_id.clone(),
            private_key_reference: self.private_key_path.clone(),
            algorithm: self.algorithm.clone(),
            cloud_region: self.cloud_region.clone(),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            connect_timeout_secs: self.connect_timeout_secs,
            publish_timeout_secs: self.publish_timeout_secs,
            location_timeout_secs: match self.location_timeout_secs {
                0 => None,
                secs => Some(secs),
            },
            ..Default::default()
        }
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_secs(self.publish_interval_secs)
    }
}
