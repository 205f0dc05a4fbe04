//! Embedded schema migrations.

use sqlx::{Pool, Sqlite};

use crate::error_handling::DatabaseError;

/// Runs the SQLx migrations in `migrations/`, embedded at compile time.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[tokio::test]
    async fn test_migrations_create_range_table() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database pool");
        run_migrations(&pool).await.expect("migrations should run");

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='geoip_ranges'",
        )
        .fetch_one(&pool)
        .await
        .expect("Failed to query sqlite_master");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database pool");
        run_migrations(&pool).await.expect("first run");
        run_migrations(&pool).await.expect("second run");
    }
}
