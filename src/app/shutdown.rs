//! Graceful shutdown handling.

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Waits for Ctrl-C, then cancels `cancel`.
pub async fn wait_for_shutdown_signal(cancel: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => warn!("Failed to listen for shutdown signal: {e}"),
            }
            cancel.cancel();
        }
        _ = cancel.cancelled() => {}
    }
}

/// Stops background tasks and waits for them to finish.
pub async fn shutdown_gracefully(cancel: CancellationToken, reload_task: Option<JoinHandle<()>>) {
    cancel.cancel();
    if let Some(task) = reload_task {
        if let Err(e) = task.await {
            warn!("Reload task ended abnormally: {e}");
        }
    }
}
