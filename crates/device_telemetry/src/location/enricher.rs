use common::domain::{LocationError, LocationProvider, LocationSample};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Single result delivered by a location request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationResolution {
    /// Provider answered; `LocationSample::Unknown` when it had no fix
    Resolved(LocationSample),
    /// The session has no location capability (permission or provider missing)
    Unavailable(LocationError),
    /// This particular request failed, was cancelled or timed out
    Failed(LocationError),
}

impl LocationResolution {
    /// Sample to publish with, or the capability error that blocks publishing.
    ///
    /// A failed request degrades to the unknown marker; only missing
    /// capability prevents the publish.
    pub fn into_sample(self) -> Result<LocationSample, LocationError> {
        match self {
            LocationResolution::Resolved(sample) => Ok(sample),
            LocationResolution::Unavailable(err) => Err(err),
            LocationResolution::Failed(err) => {
                warn!(error = %err, "location not resolved, publishing with unknown location");
                Ok(LocationSample::Unknown)
            }
        }
    }
}

/// In-flight location request. Resolves exactly once.
pub struct PendingLocation {
    receiver: oneshot::Receiver<LocationResolution>,
    task: Option<JoinHandle<()>>,
}

impl PendingLocation {
    fn ready(resolution: LocationResolution) -> Self {
        let (sender, receiver) = oneshot::channel();
        let _ = sender.send(resolution);
        Self {
            receiver,
            task: None,
        }
    }

    /// Wait for the provider's answer, at most `limit` when one is given
    pub async fn wait(mut self, limit: Option<Duration>) -> LocationResolution {
        let received = match limit {
            Some(limit) => match tokio::time::timeout(limit, &mut self.receiver).await {
                Ok(received) => received,
                Err(_) => {
                    return LocationResolution::Failed(LocationError::TimedOut(limit.as_secs()))
                }
            },
            None => (&mut self.receiver).await,
        };

        // A dropped sender means the lookup task died before answering
        received.unwrap_or(LocationResolution::Failed(LocationError::Cancelled))
    }
}

impl Drop for PendingLocation {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Resolves the device's last known position for the telemetry payload
#[derive(Clone)]
pub struct LocationEnricher {
    provider: Arc<dyn LocationProvider>,
}

impl LocationEnricher {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self { provider }
    }

    /// Start resolving without blocking the caller.
    ///
    /// Capability checks answer immediately; the lookup itself runs on its own task.
    pub fn resolve_last_known(&self) -> PendingLocation {
        if !self.provider.has_location_permission() {
            debug!("location permission not granted");
            return PendingLocation::ready(LocationResolution::Unavailable(
                LocationError::PermissionDenied,
            ));
        }
        if !self.provider.is_available() {
            debug!("no location provider available");
            return PendingLocation::ready(LocationResolution::Unavailable(
                LocationError::ProviderUnavailable,
            ));
        }

        let (sender, receiver) = oneshot::channel();
        let provider = Arc::clone(&self.provider);
        let task = tokio::spawn(async move {
            let resolution = match provider.last_known_location().await {
                Ok(Some(coordinates)) => {
                    debug!("location provider returned a position");
                    LocationResolution::Resolved(LocationSample::from_coordinates(coordinates))
                }
                Ok(None) => {
                    debug!("location provider has no last known position");
                    LocationResolution::Resolved(LocationSample::Unknown)
                }
                Err(e) if e.is_capability_failure() => LocationResolution::Unavailable(e),
                Err(e) => LocationResolution::Failed(e),
            };
            let _ = sender.send(resolution);
        });

        PendingLocation {
            receiver,
            task: Some(task),
        }
    }
}
