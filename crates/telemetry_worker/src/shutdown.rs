use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancel `token` on SIGINT, or SIGTERM on Unix.
///
/// Cancellation only stops the trigger from starting new sessions; a session
/// already running completes and disconnects first.
pub fn spawn_signal_listener(token: CancellationToken) {
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received shutdown signal");
                ctrl_c_token.cancel();
            }
            Err(err) => {
                error!("error setting up signal handler: {}", err);
            }
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    info!("received SIGTERM signal");
                    token.cancel();
                }
                Err(err) => {
                    error!("error setting up SIGTERM handler: {}", err);
                }
            }
        });
    }
}
