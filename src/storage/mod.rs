//! SQLite storage for the range table.

pub mod migrations;
pub mod pool;
pub mod ranges;
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
pub use ranges::{
    count_overlaps, count_ranges, count_ranges_in, delete_all_ranges, insert_batch, insert_ranges, load_all_ranges, load_snapshot,
    replace_ranges, SqliteRangeSource,
};
