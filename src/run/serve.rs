//! Lookup server entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::app::{shutdown_gracefully, spawn_reload_task, wait_for_shutdown_signal};
use crate::config::{BackendKind, Config};
use crate::initialization::{init_range_database, init_snapshot_handle};
use crate::server::{start_server, AppState, LookupBackend};
use crate::storage::{count_ranges, SqliteRangeSource};

/// Serves lookups until Ctrl-C.
///
/// Validates `config`, opens the range database, builds the configured
/// backend and runs the HTTP server. With the memory backend and a reload
/// interval, a background task refreshes the snapshot from SQLite.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the database cannot be
/// opened, or the listen address cannot be bound.
pub async fn run_server(config: Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let pool = init_range_database(&config.db_path).await?;
    let cancel = CancellationToken::new();

    let (backend, reload_task) = match config.backend {
        BackendKind::Memory => {
            let handle = init_snapshot_handle(&pool, &config.db_path).await?;
            let reload_task = config.reload_interval().map(|every| {
                info!("Reloading ranges every {}s", every.as_secs());
                spawn_reload_task(
                    Arc::clone(&pool),
                    Arc::clone(&handle),
                    config.db_path.clone(),
                    every,
                    cancel.child_token(),
                )
            });
            (LookupBackend::Memory(handle), reload_task)
        }
        BackendKind::Sqlite => {
            let rows = count_ranges(&pool)
                .await
                .context("Failed to count stored ranges")?;
            info!(
                "Serving {} ranges directly from {}",
                rows,
                config.db_path.display()
            );
            let source = SqliteRangeSource::checked(Arc::clone(&pool))
                .await
                .context("Failed to check stored ranges for overlaps")?;
            if source.is_disjoint() {
                info!("No overlapping ranges; SQLite lookups use index seeks");
            }
            (LookupBackend::Sqlite(source), None)
        }
    };

    let signal_task = tokio::spawn(wait_for_shutdown_signal(cancel.clone()));
    let result = start_server(
        config.listen_addr(),
        AppState::new(backend),
        cancel.child_token(),
    )
    .await;

    signal_task.abort();
    shutdown_gracefully(cancel, reload_task).await;
    pool.close().await;
    result
}
