use crate::domain::{DomainError, DomainResult, Identity};
use std::fmt;

/// Which broker a session connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSelector {
    /// Google Cloud IoT Core MQTT bridge
    GoogleCloudIot,
    /// Any MQTT broker reachable at `mqtt://host:port`, `mqtts://host:port` or `host:port`
    Broker { url: String },
}

impl EndpointSelector {
    /// Parse a selector from configuration. `gcp` (any case) selects Cloud IoT Core,
    /// anything else is treated as a broker URL.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("gcp") || value.eq_ignore_ascii_case("google") {
            EndpointSelector::GoogleCloudIot
        } else {
            EndpointSelector::Broker {
                url: value.to_string(),
            }
        }
    }
}

impl fmt::Display for EndpointSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointSelector::GoogleCloudIot => write!(f, "gcp"),
            EndpointSelector::Broker { url } => write!(f, "{}", url),
        }
    }
}

/// Input record handed to each triggered run by the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryJobInput {
    pub endpoint: EndpointSelector,
    pub device_id: Option<String>,
    pub project_id: String,
    pub registry_id: String,
    pub private_key_reference: String,
    pub algorithm: String,
    pub cloud_region: String,
}

impl TelemetryJobInput {
    /// Validate the record and extract the session identity.
    ///
    /// A missing device ID aborts the run before any connection attempt.
    /// Cloud IoT Core additionally needs the project and registry to build
    /// the client id.
    pub fn identity(&self) -> DomainResult<Identity> {
        let device_id = self
            .device_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DomainError::InvalidJobInput("Device ID is required".to_string()))?;

        if self.endpoint == EndpointSelector::GoogleCloudIot {
            require("Project ID", &self.project_id)?;
            require("Registry ID", &self.registry_id)?;
            require("Cloud region", &self.cloud_region)?;
        }

        Ok(Identity {
            device_id: device_id.to_string(),
            project_id: self.project_id.trim().to_string(),
            registry_id: self.registry_id.trim().to_string(),
            cloud_region: self.cloud_region.trim().to_string(),
            algorithm: self.algorithm.trim().to_string(),
            private_key_reference: self.private_key_reference.trim().to_string(),
        })
    }
}

fn require(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidJobInput(format!(
            "{} is required for Cloud IoT Core",
            field
        )));
    }
    Ok(())
}
