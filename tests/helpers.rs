// Shared test helpers for database setup and feed files.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::{Path, PathBuf};

use sqlx::SqlitePool;

use geoip_ranges::storage::run_migrations;

/// A small raw feed in the distributed layout: quoted, headerless, with
/// placeholder rows around real ones.
#[allow(dead_code)] // Used by other test files
pub const RAW_FEED: &str = concat!(
    "\"0\",\"281470681743359\",\"-\",\"-\",\"-\",\"-\",\"0.000000\",\"0.000000\",\"-\",\"-\"\n",
    "\"281470681743360\",\"281470698520575\",\"-\",\"-\",\"-\",\"-\",\"0.000000\",\"0.000000\",\"-\",\"-\"\n",
    "\"281470698520576\",\"281470698520831\",\"AU\",\"Australia\",\"Queensland\",\"Brisbane\",\"-27.467940\",\"153.028090\",\"4000\",\"+10:00\"\n",
    "\"281470816487424\",\"281470816487679\",\"US\",\"United States of America\",\"California\",\"Mountain View\",\"37.405992\",\"-122.078515\",\"94043\",\"-07:00\"\n",
    "\"281470816487680\",\"281474976710655\",\"US\",\"United States of America\",\"-\",\"-\",\"0.000000\",\"0.000000\",\"-\",\"-\"\n",
    "\"42540528726795050063891204319802818560\",\"42540528806023212578155541913346768895\",\"JP\",\"Japan\",\"Tokyo\",\"Tokyo\",\"35.689500\",\"139.691710\",\"100-0001\",\"+09:00\"\n",
);

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Writes `contents` to `name` inside `dir` and returns the path.
#[allow(dead_code)] // Used by other test files
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}
