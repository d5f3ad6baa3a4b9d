use async_trait::async_trait;
use common::domain::{Coordinates, LocationError, LocationProvider};

/// Location provider for hosts without a positioning service.
///
/// Reports a fixed, configured position, or no fix when none is configured.
#[derive(Debug, Clone)]
pub struct StaticLocationProvider {
    permitted: bool,
    coordinates: Option<Coordinates>,
}

impl StaticLocationProvider {
    pub fn new(permitted: bool, coordinates: Option<Coordinates>) -> Self {
        Self {
            permitted,
            coordinates,
        }
    }

    /// Build from optional configured latitude and longitude; both must be set to form a fix
    pub fn from_config(permitted: bool, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        let coordinates = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };
        Self::new(permitted, coordinates)
    }
}

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    fn has_location_permission(&self) -> bool {
        self.permitted
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn last_known_location(&self) -> Result<Option<Coordinates>, LocationError> {
        Ok(self.coordinates)
    }
}
