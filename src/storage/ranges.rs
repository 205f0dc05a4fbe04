//! Range table reads and writes.

use std::future::Future;
use std::sync::Arc;

use futures::TryStreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use crate::config::IMPORT_BATCH_SIZE;
use crate::error_handling::{DatabaseError, SourceError};
use crate::geoip::{AddressKey, RangeRecord, RangeSnapshot, RangeSource};

// Walks every index entry below the key; needed once ranges overlap.
const CANDIDATES_SQL: &str = "SELECT ip_from, ip_to, country_code, country_name, region_name,
        city_name, latitude, longitude, zip_code, time_zone
 FROM geoip_ranges
 WHERE ip_from <= ? AND ip_to >= ?
 ORDER BY id";

// Two index seeks. Only complete when no two stored ranges overlap.
const DISJOINT_CANDIDATES_SQL: &str = "SELECT ip_from, ip_to, country_code, country_name, region_name,
        city_name, latitude, longitude, zip_code, time_zone
 FROM geoip_ranges
 WHERE ip_from = (SELECT MAX(ip_from) FROM geoip_ranges WHERE ip_from <= ?)
   AND ip_to >= ?
 ORDER BY id";

const COUNT_OVERLAPS_SQL: &str = "SELECT COUNT(*) FROM (
    SELECT ip_from,
           MAX(ip_to) OVER (ORDER BY ip_from, id
                            ROWS BETWEEN UNBOUNDED PRECEDING AND 1 PRECEDING) AS reach
    FROM geoip_ranges
 )
 WHERE reach >= ip_from";

const LOAD_ALL_SQL: &str = "SELECT ip_from, ip_to, country_code, country_name, region_name,
        city_name, latitude, longitude, zip_code, time_zone
 FROM geoip_ranges
 ORDER BY ip_from, id";

/// Range source that queries SQLite on every lookup.
///
/// The memory backend is the fast path for large feeds. This source serves
/// straight from the table; on a table checked to be free of overlaps it
/// finds the one candidate with two index seeks instead of a range scan.
#[derive(Clone)]
pub struct SqliteRangeSource {
    pool: Arc<SqlitePool>,
    disjoint: bool,
}

impl SqliteRangeSource {
    /// Source using the range scan, correct for any table contents.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        SqliteRangeSource {
            pool,
            disjoint: false,
        }
    }

    /// Source that checks the stored ranges once and uses the seek query when
    /// none overlap.
    ///
    /// The check is not repeated; rows appended later with overlaps call for
    /// a new source.
    pub async fn checked(pool: Arc<SqlitePool>) -> Result<Self, DatabaseError> {
        let overlaps = count_overlaps(&pool).await?;
        if overlaps > 0 {
            log::warn!("{overlaps} stored ranges overlap; SQLite lookups will scan");
        }
        Ok(SqliteRangeSource {
            pool,
            disjoint: overlaps == 0,
        })
    }

    /// Pool the source reads from
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Whether lookups use the seek query
    pub fn is_disjoint(&self) -> bool {
        self.disjoint
    }
}

impl RangeSource for SqliteRangeSource {
    fn candidates(
        &self,
        key: AddressKey,
    ) -> impl Future<Output = Result<Vec<RangeRecord>, SourceError>> + Send {
        let pool = Arc::clone(&self.pool);
        let sql = if self.disjoint {
            DISJOINT_CANDIDATES_SQL
        } else {
            CANDIDATES_SQL
        };
        async move {
            let padded = key.to_padded();
            let rows = sqlx::query(sql)
                .bind(&padded)
                .bind(&padded)
                .fetch_all(pool.as_ref())
                .await?;
            rows.iter().map(record_from_row).collect()
        }
    }
}

fn record_from_row(row: &SqliteRow) -> Result<RangeRecord, SourceError> {
    Ok(RangeRecord {
        ip_from: stored_key(row, "ip_from")?,
        ip_to: stored_key(row, "ip_to")?,
        country_code: row.try_get("country_code")?,
        country_name: row.try_get("country_name")?,
        region_name: row.try_get("region_name")?,
        city_name: row.try_get("city_name")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        zip_code: row.try_get("zip_code")?,
        time_zone: row.try_get("time_zone")?,
    })
}

fn stored_key(row: &SqliteRow, column: &str) -> Result<AddressKey, SourceError> {
    let text: String = row.try_get(column)?;
    text.parse()
        .map_err(|_| SourceError::MalformedRow(format!("{column} \"{text}\" is not a decimal key")))
}

/// Inserts `records` with one multi-row `INSERT` per batch.
///
/// Runs on the caller's connection so it can take part in a transaction.
pub async fn insert_batch(
    conn: &mut SqliteConnection,
    records: &[RangeRecord],
) -> Result<u64, DatabaseError> {
    let mut inserted = 0;
    for chunk in records.chunks(IMPORT_BATCH_SIZE) {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO geoip_ranges (ip_from, ip_to, country_code, country_name, region_name,
                city_name, latitude, longitude, zip_code, time_zone) ",
        );
        builder.push_values(chunk, |mut row, record| {
            row.push_bind(record.ip_from.to_padded())
                .push_bind(record.ip_to.to_padded())
                .push_bind(record.country_code.clone())
                .push_bind(record.country_name.clone())
                .push_bind(record.region_name.clone())
                .push_bind(record.city_name.clone())
                .push_bind(record.latitude)
                .push_bind(record.longitude)
                .push_bind(record.zip_code.clone())
                .push_bind(record.time_zone.clone());
        });
        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(inserted)
}

/// Deletes every stored range. Returns the number of rows removed.
pub async fn delete_all_ranges(conn: &mut SqliteConnection) -> Result<u64, DatabaseError> {
    let result = sqlx::query("DELETE FROM geoip_ranges").execute(conn).await?;
    Ok(result.rows_affected())
}

/// Number of stored ranges, read on the caller's connection.
pub async fn count_ranges_in(conn: &mut SqliteConnection) -> Result<i64, DatabaseError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM geoip_ranges")
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// Appends `records` in a single transaction.
pub async fn insert_ranges(pool: &SqlitePool, records: &[RangeRecord]) -> Result<u64, DatabaseError> {
    let mut tx = pool.begin().await?;
    let inserted = insert_batch(&mut tx, records).await?;
    tx.commit().await?;
    Ok(inserted)
}

/// Replaces the whole range table with `records` in a single transaction.
///
/// Readers see either the old table or the new one, never a mix.
pub async fn replace_ranges(
    pool: &SqlitePool,
    records: &[RangeRecord],
) -> Result<u64, DatabaseError> {
    let mut tx = pool.begin().await?;
    let removed = delete_all_ranges(&mut tx).await?;
    let inserted = insert_batch(&mut tx, records).await?;
    tx.commit().await?;
    log::debug!("Replaced {removed} stored ranges with {inserted}");
    Ok(inserted)
}

/// Number of stored ranges.
pub async fn count_ranges(pool: &SqlitePool) -> Result<i64, DatabaseError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM geoip_ranges")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Number of stored ranges that start inside an earlier one.
pub async fn count_overlaps(pool: &SqlitePool) -> Result<i64, DatabaseError> {
    let count = sqlx::query_scalar(COUNT_OVERLAPS_SQL).fetch_one(pool).await?;
    Ok(count)
}

/// Reads every stored range, ascending by `ip_from`.
pub async fn load_all_ranges(pool: &SqlitePool) -> Result<Vec<RangeRecord>, SourceError> {
    let mut rows = sqlx::query(LOAD_ALL_SQL).fetch(pool);
    let mut records = Vec::new();
    while let Some(row) = rows.try_next().await? {
        records.push(record_from_row(&row)?);
    }
    Ok(records)
}

/// Builds an in-memory snapshot from every stored range.
pub async fn load_snapshot(
    pool: &SqlitePool,
    source: impl Into<String>,
) -> Result<RangeSnapshot, SourceError> {
    let records = load_all_ranges(pool).await?;
    Ok(RangeSnapshot::new(records, source))
}
