use crate::domain::LocationError;
use async_trait::async_trait;

/// Marker sent in place of a coordinate that could not be resolved
pub const UNKNOWN_LOCATION: &str = "unknown";

/// Raw position reported by a location provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Position attached to a telemetry message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSample {
    Known { latitude: String, longitude: String },
    Unknown,
}

impl LocationSample {
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        if !coordinates.latitude.is_finite() || !coordinates.longitude.is_finite() {
            return LocationSample::Unknown;
        }
        LocationSample::Known {
            latitude: format_coordinate(coordinates.latitude),
            longitude: format_coordinate(coordinates.longitude),
        }
    }

    pub fn latitude(&self) -> &str {
        match self {
            LocationSample::Known { latitude, .. } => latitude,
            LocationSample::Unknown => UNKNOWN_LOCATION,
        }
    }

    pub fn longitude(&self) -> &str {
        match self {
            LocationSample::Known { longitude, .. } => longitude,
            LocationSample::Unknown => UNKNOWN_LOCATION,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, LocationSample::Known { .. })
    }
}

/// Format a coordinate with exactly seven decimal places
pub fn format_coordinate(value: f64) -> String {
    let formatted = format!("{:.7}", value);
    // -0.00000001 rounds to "-0.0000000"
    match formatted.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => formatted,
    }
}

/// Platform service that knows the device's most recent position
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Whether this process may read the device location
    fn has_location_permission(&self) -> bool;

    /// Whether a positioning backend is present at all
    fn is_available(&self) -> bool;

    /// Most recent known position; `None` when the platform has no fix yet
    async fn last_known_location(&self) -> Result<Option<Coordinates>, LocationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_digit_coordinates_unchanged() {
        let sample = LocationSample::from_coordinates(Coordinates {
            latitude: 37.4219999,
            longitude: -122.0840575,
        });
        assert_eq!(sample.latitude(), "37.4219999");
        assert_eq!(sample.longitude(), "-122.0840575");
    }

    #[test]
    fn test_coordinates_rounded_to_seven_digits() {
        assert_eq!(format_coordinate(51.507350812), "51.5073508");
        assert_eq!(format_coordinate(-0.12775829), "-0.1277583");
        assert_eq!(format_coordinate(10.5), "10.5000000");
    }

    #[test]
    fn test_negative_zero_normalized() {
        assert_eq!(format_coordinate(-0.00000001), "0.0000000");
        assert_eq!(format_coordinate(-0.0), "0.0000000");
    }

    #[test]
    fn test_unknown_sample() {
        let sample = LocationSample::Unknown;
        assert_eq!(sample.latitude(), "unknown");
        assert_eq!(sample.longitude(), "unknown");
        assert!(!sample.is_known());
    }

    #[test]
    fn test_non_finite_coordinates_are_unknown() {
        let sample = LocationSample::from_coordinates(Coordinates {
            latitude: f64::NAN,
            longitude: 0.0,
        });
        assert_eq!(sample, LocationSample::Unknown);
    }
}
