mod periodic_trigger;
mod session_config;
mod status_observers;
mod telemetry_session_orchestrator;

pub use periodic_trigger::*;
pub use session_config::*;
pub use status_observers::*;
pub use telemetry_session_orchestrator::*;
