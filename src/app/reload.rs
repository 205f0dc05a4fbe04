//! Periodic snapshot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::geoip::SnapshotHandle;
use crate::initialization::build_snapshot;

/// Rebuilds the snapshot from SQLite and swaps it into `handle`.
///
/// On failure the current snapshot stays in place. Returns the new row count.
pub async fn reload_snapshot(
    pool: &SqlitePool,
    handle: &SnapshotHandle,
    db_path: &Path,
) -> Result<usize> {
    let snapshot = build_snapshot(pool, db_path).await?;
    let rows = snapshot.len();
    let previous = handle.replace(snapshot);
    info!("Reloaded range snapshot: {} ranges (was {})", rows, previous.len());
    Ok(rows)
}

/// Spawns a task that reloads the snapshot every `every` until `cancel` fires.
///
/// The first reload happens one full interval after startup.
pub fn spawn_reload_task(
    pool: Arc<SqlitePool>,
    handle: Arc<SnapshotHandle>,
    db_path: PathBuf,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = reload_snapshot(&pool, &handle, &db_path).await {
                        warn!("Range reload failed, keeping current snapshot: {e:#}");
                    }
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
    })
}
