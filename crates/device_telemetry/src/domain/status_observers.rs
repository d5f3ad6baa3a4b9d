use common::domain::{SessionOutcome, StatusObserver};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Writes every status notification to the log
#[derive(Debug, Default, Clone)]
pub struct TracingStatusObserver;

impl StatusObserver for TracingStatusObserver {
    fn notify(&self, outcome: &SessionOutcome) {
        if outcome.is_failure() {
            warn!(status = %outcome, "telemetry session status");
        } else {
            info!(status = %outcome, "telemetry session status");
        }
    }
}

/// Forwards status strings to a listener such as a UI, dropping them once the listener is gone
#[derive(Debug, Clone)]
pub struct ChannelStatusObserver {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelStatusObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl StatusObserver for ChannelStatusObserver {
    fn notify(&self, outcome: &SessionOutcome) {
        // Nobody listening is fine; status updates are best effort
        let _ = self.sender.send(outcome.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_observer_forwards_status_strings() {
        let (observer, mut receiver) = ChannelStatusObserver::new();
        observer.notify(&SessionOutcome::Connected);
        observer.notify(&SessionOutcome::LocationUnavailable);

        assert_eq!(receiver.try_recv().unwrap(), "MQTT Connected");
        assert_eq!(
            receiver.try_recv().unwrap(),
            "Real data not published to server. Need location access"
        );
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_channel_observer_without_listener() {
        let (observer, receiver) = ChannelStatusObserver::new();
        drop(receiver);
        observer.notify(&SessionOutcome::Connected);
    }

    #[test]
    fn test_tracing_observer_accepts_all_outcomes() {
        let observer = TracingStatusObserver;
        observer.notify(&SessionOutcome::Connected);
        observer.notify(&SessionOutcome::PublishFailed("QUOTA_EXCEEDED".to_string()));
    }
}
