use crate::domain::TelemetrySessionOrchestrator;
use common::domain::TelemetryJobInput;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Shortest interval accepted between two sessions
pub const MIN_PUBLISH_INTERVAL: Duration = Duration::from_secs(1);

/// Starts telemetry sessions on a fixed interval until shutdown.
///
/// Sessions never overlap: the next tick is only awaited once the previous
/// session has disconnected, and ticks missed while a session runs are
/// delayed rather than burst.
pub struct PeriodicTrigger {
    interval: Duration,
    run_once: bool,
}

impl PeriodicTrigger {
    pub fn new(interval: Duration, run_once: bool) -> Self {
        Self {
            interval: interval.max(MIN_PUBLISH_INTERVAL),
            run_once,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run sessions until `shutdown_token` is cancelled, or after one session in run-once mode.
    /// Returns the number of sessions that ran.
    ///
    /// A session in flight when shutdown arrives runs to completion.
    pub async fn run(
        &self,
        orchestrator: &TelemetrySessionOrchestrator,
        input: &TelemetryJobInput,
        shutdown_token: CancellationToken,
    ) -> u64 {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sessions = 0;

        info!(
            interval_secs = self.interval.as_secs(),
            run_once = self.run_once,
            "starting telemetry trigger"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown_token.cancelled() => {
                    debug!("shutdown requested, stopping telemetry trigger");
                    break;
                }
                _ = ticker.tick() => {
                    let outcome = orchestrator.run_session(input).await;
                    sessions += 1;
                    debug!(sessions, outcome = %outcome, "telemetry session completed");

                    if self.run_once {
                        break;
                    }
                }
            }
        }

        info!(sessions, "telemetry trigger stopped");
        sessions
    }
}
