use common::domain::{ConnectError, Credential, EndpointSelector, Identity};
use std::fmt;

pub const GOOGLE_CLOUD_IOT_HOST: &str = "mqtt.googleapis.com";
pub const GOOGLE_CLOUD_IOT_PORT: u16 = 8883;
pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const DEFAULT_MQTTS_PORT: u16 = 8883;

/// Cloud IoT Core ignores the username but MQTT requires one alongside a password
const GOOGLE_CLOUD_IOT_USERNAME: &str = "unused";

/// Everything the transport needs to open one broker connection
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    pub client_id: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Host, port and TLS flag parsed from a broker URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
}

/// Build connection parameters for the selected endpoint, using the credential token as password
pub fn connect_params(
    endpoint: &EndpointSelector,
    identity: &Identity,
    credential: &Credential,
) -> Result<ConnectParams, ConnectError> {
    match endpoint {
        EndpointSelector::GoogleCloudIot => Ok(ConnectParams {
            host: GOOGLE_CLOUD_IOT_HOST.to_string(),
            port: GOOGLE_CLOUD_IOT_PORT,
            use_tls: true,
            client_id: identity.device_path(),
            username: GOOGLE_CLOUD_IOT_USERNAME.to_string(),
            password: credential.token().to_string(),
        }),
        EndpointSelector::Broker { url } => {
            let address = parse_broker_url(url)?;
            Ok(ConnectParams {
                host: address.host,
                port: address.port,
                use_tls: address.use_tls,
                client_id: identity.device_id.clone(),
                username: identity.device_id.clone(),
                password: credential.token().to_string(),
            })
        }
    }
}

/// Topic telemetry events for a device are published on
pub fn telemetry_topic(device_id: &str) -> String {
    format!("/devices/{}/events", device_id)
}

/// Parse broker URL in format mqtt://host:port, tcp://host:port, mqtts://host:port,
/// ssl://host:port or host:port
pub fn parse_broker_url(url: &str) -> Result<BrokerAddress, ConnectError> {
    let trimmed = url.trim();
    let (rest, use_tls) = if let Some(rest) = trimmed
        .strip_prefix("mqtts://")
        .or_else(|| trimmed.strip_prefix("ssl://"))
    {
        (rest, true)
    } else {
        let rest = trimmed.trim_start_matches("mqtt://");
        (rest.trim_start_matches("tcp://"), false)
    };
    let default_port = if use_tls {
        DEFAULT_MQTTS_PORT
    } else {
        DEFAULT_MQTT_PORT
    };

    let parts: Vec<&str> = rest.split(':').collect();
    let (host, port) = match parts.as_slice() {
        [host] => (*host, default_port),
        [host, port] => {
            let port = port.parse::<u16>().map_err(|_| {
                ConnectError::InvalidEndpoint(format!("Invalid port in broker URL: {}", port))
            })?;
            (*host, port)
        }
        _ => {
            return Err(ConnectError::InvalidEndpoint(format!(
                "Invalid broker URL format: {}",
                url
            )))
        }
    };

    if host.is_empty() {
        return Err(ConnectError::InvalidEndpoint(format!(
            "Missing host in broker URL: {}",
            url
        )));
    }

    Ok(BrokerAddress {
        host: host.to_string(),
        port,
        use_tls,
    })
}
