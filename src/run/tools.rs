//! One-shot command entry points: import, convert and lookup.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::geoip::{lookup, LookupResult};
use crate::import::{convert_csv, import_csv, ImportReport};
use crate::initialization::init_range_database;
use crate::storage::SqliteRangeSource;

/// Loads `input` into the range database at `db_path`.
///
/// With `replace`, the existing ranges are deleted in the same transaction.
pub async fn run_import(input: &Path, db_path: &Path, replace: bool) -> Result<ImportReport> {
    let pool = init_range_database(db_path).await?;
    let report = import_csv(input, &pool, replace).await;
    pool.close().await;
    report
}

/// Filters the raw feed at `input` into a CSV file at `output`.
pub fn run_convert(input: &Path, output: &Path) -> Result<ImportReport> {
    if input == output {
        bail!("Input and output must be different files");
    }
    convert_csv(input, output)
}

/// Resolves one address against the range database at `db_path`.
pub async fn run_lookup(address: &str, db_path: &Path) -> Result<LookupResult> {
    if !db_path.exists() {
        bail!(
            "Range database {} does not exist; run `import` first",
            db_path.display()
        );
    }
    let pool = init_range_database(db_path).await?;
    let source = SqliteRangeSource::new(pool.clone());
    let result = lookup(address, &source)
        .await
        .with_context(|| format!("Lookup of {address} failed"));
    pool.close().await;
    result
}
