mod credential;
mod device_snapshot;
mod identity;
mod job_input;
mod location;
mod result;
mod session_outcome;
mod telemetry_message;

pub use credential::*;
pub use device_snapshot::*;
pub use identity::*;
pub use job_input::*;
pub use location::*;
pub use result::*;
pub use session_outcome::*;
pub use telemetry_message::*;
