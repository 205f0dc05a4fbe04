//! Feed conversion and database import.
//!
//! `convert_csv` writes the filtered feed back out as CSV with a header row;
//! `import_csv` loads it into the SQLite range table.

use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use log::{info, warn};
use sqlx::SqlitePool;

use super::feed::{feed_row, FeedReader, ImportReport};
use crate::config::{FEED_COLUMNS, IMPORT_BATCH_SIZE};
use crate::storage::{count_ranges_in, delete_all_ranges, insert_batch};

/// Filters a feed file into a CSV file with a header row.
///
/// Placeholder rows are dropped and malformed rows are skipped; both are
/// counted in the returned report.
pub fn convert_csv(input: &Path, output: &Path) -> Result<ImportReport> {
    let mut feed = FeedReader::open(input)?;
    let mut writer = Writer::from_path(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;

    writer
        .write_record(FEED_COLUMNS)
        .context("Failed to write CSV header")?;

    let mut written = 0;
    while let Some(record) = feed.next_record()? {
        writer
            .write_record(feed_row(&record))
            .context("Failed to write CSV row")?;
        written += 1;
    }
    writer.flush().context("Failed to flush CSV writer")?;

    let mut report = feed.into_report();
    report.rows_written = written;
    info!(
        "Converted {}: {} rows written, {} placeholders dropped, {} malformed",
        input.display(),
        report.rows_written,
        report.placeholders_dropped,
        report.malformed_rejected
    );
    Ok(report)
}

/// Loads a feed file (raw or converted) into the range table.
///
/// All rows go in one transaction. With `replace`, existing rows are deleted
/// first in the same transaction, so a failed import leaves the table as it
/// was. Without it, rows are appended and a non-empty table is warned about,
/// since importing the same feed twice stores every range twice.
pub async fn import_csv(input: &Path, pool: &SqlitePool, replace: bool) -> Result<ImportReport> {
    let mut feed = FeedReader::open(input)?;
    let mut tx = pool
        .begin()
        .await
        .context("Failed to start import transaction")?;

    let existing = if replace {
        let removed = delete_all_ranges(&mut tx)
            .await
            .context("Failed to clear existing ranges")?;
        info!("Removed {removed} existing ranges");
        0
    } else {
        let existing = count_ranges_in(&mut tx)
            .await
            .context("Failed to count existing ranges")?;
        if existing > 0 {
            warn!(
                "Appending to {existing} existing ranges; use --replace to swap the table instead"
            );
        }
        existing
    };

    let mut batch = Vec::with_capacity(IMPORT_BATCH_SIZE);
    let mut written = 0u64;
    while let Some(record) = feed.next_record()? {
        batch.push(record);
        if batch.len() == IMPORT_BATCH_SIZE {
            written += insert_batch(&mut tx, &batch)
                .await
                .context("Failed to insert range batch")?;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        written += insert_batch(&mut tx, &batch)
            .await
            .context("Failed to insert range batch")?;
    }

    tx.commit().await.context("Failed to commit import")?;

    let mut report = feed.into_report();
    report.rows_written = written as usize;
    report.existing_ranges = existing as usize;
    info!(
        "Imported {}: {} rows written, {} placeholders dropped, {} malformed",
        input.display(),
        report.rows_written,
        report.placeholders_dropped,
        report.malformed_rejected
    );
    Ok(report)
}
