use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum wait for the broker CONNACK (default: 10 seconds)
    pub connect_timeout_secs: u64,

    /// Maximum wait for the broker PUBACK (default: 10 seconds)
    pub publish_timeout_secs: u64,

    /// Maximum time spent flushing the DISCONNECT packet (default: 2 seconds)
    pub disconnect_timeout_secs: u64,

    /// MQTT keep-alive interval (default: 60 seconds)
    pub keep_alive_secs: u64,

    /// Bound on the location wait; `None` waits for the provider's own completion
    pub location_timeout_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            publish_timeout_secs: 10,
            disconnect_timeout_secs: 2,
            keep_alive_secs: 60,
            location_timeout_secs: Some(10),
        }
    }
}

impl SessionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    pub fn disconnect_timeout(&self) -> Duration {
        Duration::from_secs(self.disconnect_timeout_secs)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn location_timeout(&self) -> Option<Duration> {
        self.location_timeout_secs.map(Duration::from_secs)
    }
}
