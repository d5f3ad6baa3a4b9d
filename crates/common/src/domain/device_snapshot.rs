/// Sentinel for numeric device readings that could not be taken
pub const BATTERY_UNKNOWN: i32 = -1;

/// Point-in-time read of device and battery state
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    pub model: String,
    pub os_version: String,
    pub patch_level: String,
    pub release_version: String,
    /// Charge in percent, `-1.0` when unreadable
    pub battery_level_pct: f32,
    /// Vendor-reported health in percent, `-1` when unreadable
    pub battery_health_pct: i32,
}

impl DeviceSnapshot {
    /// Charge percentage from a raw battery level and scale.
    ///
    /// Returns the sentinel when either reading is missing or the scale is not positive.
    pub fn battery_pct_from(level: i32, scale: i32) -> f32 {
        if level == BATTERY_UNKNOWN || scale == BATTERY_UNKNOWN || scale <= 0 {
            return BATTERY_UNKNOWN as f32;
        }
        (level as f32 / scale as f32) * 100.0
    }

    /// Battery level as carried on the wire, truncated toward zero
    pub fn battery_level(&self) -> i32 {
        if self.battery_level_pct.is_finite() {
            self.battery_level_pct as i32
        } else {
            BATTERY_UNKNOWN
        }
    }
}

/// Supplies device state before a session starts
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait DeviceSnapshotSource: Send + Sync {
    fn snapshot(&self) -> DeviceSnapshot;
}
