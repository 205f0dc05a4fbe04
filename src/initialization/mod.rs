//! Application initialization and resource setup.
//!
//! Logger setup and the database/dataset resources shared by the server
//! and the command-line tools.

mod logger;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use sqlx::SqlitePool;

use crate::geoip::{RangeSnapshot, SnapshotHandle};
use crate::storage::{init_db_pool_with_path, load_snapshot, run_migrations};

// Re-export public API
pub use logger::init_logger_with;

/// Opens (creating if needed) the range database and applies migrations.
pub async fn init_range_database(db_path: &Path) -> Result<Arc<SqlitePool>> {
    let pool = init_db_pool_with_path(db_path)
        .await
        .with_context(|| format!("Failed to open range database {}", db_path.display()))?;
    run_migrations(&pool)
        .await
        .context("Failed to apply database migrations")?;
    Ok(pool)
}

/// Loads every stored range into a fresh in-memory snapshot.
///
/// Overlapping ranges are reported once here; lookups still resolve them by
/// preferring the range with the largest start.
pub async fn build_snapshot(pool: &SqlitePool, db_path: &Path) -> Result<RangeSnapshot> {
    let snapshot = load_snapshot(pool, db_path.display().to_string())
        .await
        .context("Failed to load range dataset")?;

    let overlaps = snapshot.overlap_count();
    if overlaps > 0 {
        warn!("Range dataset has {overlaps} overlapping ranges; the most specific start wins");
    }
    if snapshot.is_empty() {
        warn!("Range dataset is empty; every lookup will report not found");
    }
    info!("Loaded {} ranges from {}", snapshot.len(), db_path.display());
    Ok(snapshot)
}

/// Builds a snapshot and wraps it in a shareable handle.
pub async fn init_snapshot_handle(pool: &SqlitePool, db_path: &Path) -> Result<Arc<SnapshotHandle>> {
    let snapshot = build_snapshot(pool, db_path).await?;
    Ok(Arc::new(SnapshotHandle::new(snapshot)))
}
