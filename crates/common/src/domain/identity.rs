/// Device identity used to authenticate against the cloud broker.
///
/// Supplied by the caller at session start and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub device_id: String,
    pub project_id: String,
    pub registry_id: String,
    pub cloud_region: String,
    /// JWT signing algorithm name, e.g. `RS256` or `ES256`
    pub algorithm: String,
    /// Path (absolute, or relative to the configured key directory) of the PEM private key
    pub private_key_reference: String,
}

impl Identity {
    /// Fully qualified device path used by Cloud IoT Core as the MQTT client id
    pub fn device_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/registries/{}/devices/{}",
            self.project_id, self.cloud_region, self.registry_id, self.device_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_path() {
        let identity = Identity {
            device_id: "scanner-01".to_string(),
            project_id: "fleet-project".to_string(),
            registry_id: "warehouse".to_string(),
            cloud_region: "europe-west1".to_string(),
            algorithm: "RS256".to_string(),
            private_key_reference: "rsa_private.pem".to_string(),
        };

        assert_eq!(
            identity.device_path(),
            "projects/fleet-project/locations/europe-west1/registries/warehouse/devices/scanner-01"
        );
    }
}
