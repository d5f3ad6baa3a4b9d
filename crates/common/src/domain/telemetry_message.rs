use crate::domain::{DeviceSnapshot, LocationSample, PublishError};
use serde::Serialize;

/// Wire payload published once per session.
///
/// Field order is part of the broker contract and matches declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryMessage {
    pub device_id: String,
    pub model: String,
    pub latitude: String,
    pub longitude: String,
    pub battery_level: i32,
    pub battery_health: i32,
    pub os_version: String,
    pub patch_level: String,
    pub release_version: String,
}

impl TelemetryMessage {
    pub fn build(device_id: &str, snapshot: &DeviceSnapshot, location: &LocationSample) -> Self {
        Self {
            device_id: device_id.to_string(),
            model: snapshot.model.clone(),
            latitude: location.latitude().to_string(),
            longitude: location.longitude().to_string(),
            battery_level: snapshot.battery_level(),
            battery_health: snapshot.battery_health_pct,
            os_version: snapshot.os_version.clone(),
            patch_level: snapshot.patch_level.clone(),
            release_version: snapshot.release_version.clone(),
        }
    }

    /// JSON encoding of the message
    pub fn to_payload(&self) -> Result<Vec<u8>, PublishError> {
        serde_json::to_vec(self).map_err(|e| PublishError::Encoding(e.to_string()))
    }
}
