//! Range feed import.
//!
//! Turns the raw range feed into validated `RangeRecord`s, drops placeholder
//! rows, and writes the result either to a filtered CSV file or to the SQLite
//! range table.

mod convert;
mod feed;

pub use convert::{convert_csv, import_csv};
pub use feed::{feed_row, parse_feed_row, FeedReader, ImportReport};
