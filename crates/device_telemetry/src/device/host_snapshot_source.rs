use common::domain::{DeviceSnapshot, DeviceSnapshotSource, BATTERY_UNKNOWN};
use sysinfo::System;

const UNKNOWN_FIELD: &str = "unknown";

/// Reads device identity fields from the host operating system.
///
/// Battery readings are reported as the sentinel; hosts without a battery
/// service have nothing better to offer.
#[derive(Debug, Default, Clone)]
pub struct HostDeviceSnapshotSource {
    model_override: Option<String>,
}

impl HostDeviceSnapshotSource {
    pub fn new(model_override: Option<String>) -> Self {
        Self { model_override }
    }
}

impl DeviceSnapshotSource for HostDeviceSnapshotSource {
    fn snapshot(&self) -> DeviceSnapshot {
        let model = self
            .model_override
            .clone()
            .or_else(System::host_name)
            .unwrap_or_else(|| UNKNOWN_FIELD.to_string());

        DeviceSnapshot {
            model,
            os_version: System::os_version().unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            patch_level: System::kernel_version().unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            release_version: System::long_os_version()
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            battery_level_pct: BATTERY_UNKNOWN as f32,
            battery_health_pct: BATTERY_UNKNOWN,
        }
    }
}
