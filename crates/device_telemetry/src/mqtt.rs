mod broker_session;
mod endpoint;
mod rumqttc_transport;
mod transport;

pub use broker_session::*;
pub use endpoint::*;
pub use rumqttc_transport::*;
pub use transport::*;
