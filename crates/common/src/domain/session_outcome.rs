use chrono::{DateTime, Local};
use std::fmt;

/// Result of a telemetry session step, as reported to the status observer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Connected,
    ConnectFailed(String),
    Published(DateTime<Local>),
    PublishFailed(String),
    LocationUnavailable,
}

impl SessionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SessionOutcome::ConnectFailed(_)
                | SessionOutcome::PublishFailed(_)
                | SessionOutcome::LocationUnavailable
        )
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Connected => write!(f, "MQTT Connected"),
            SessionOutcome::ConnectFailed(reason) => write!(f, "{}", reason),
            SessionOutcome::Published(at) => {
                write!(f, "Real data published to MQTT at {}", at.format("%H:%M:%S"))
            }
            SessionOutcome::PublishFailed(reason) => write!(f, "{}", reason),
            SessionOutcome::LocationUnavailable => {
                write!(f, "Real data not published to server. Need location access")
            }
        }
    }
}

/// One-way sink for human readable session status
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait StatusObserver: Send + Sync {
    fn notify(&self, outcome: &SessionOutcome);
}
