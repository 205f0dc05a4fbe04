//! Range feed parsing.
//!
//! Reads the flat range feed (`ipFrom, ipTo, countryCode, countryName,
//! regionName, cityName, latitude, longitude, zipCode, timeZone`) row by row,
//! turning each row into a validated `RangeRecord` and dropping placeholder
//! rows. Both the raw headerless feed and converted files with a header row
//! are accepted.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{Reader, ReaderBuilder, StringRecord};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{FEED_COLUMNS, IMPORT_PROGRESS_INTERVAL};
use crate::error_handling::ImportError;
use crate::geoip::{AddressKey, RangeRecord};

/// Counters for one pass over a feed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Data rows read (header excluded)
    pub rows_read: usize,
    /// Rows written to the output file or database
    pub rows_written: usize,
    /// Placeholder rows dropped
    pub placeholders_dropped: usize,
    /// Rows rejected by validation
    pub malformed_rejected: usize,
    /// Ranges already stored that an appending import added to
    pub existing_ranges: usize,
}

/// Parses one feed row into a range record.
pub fn parse_feed_row(row: &StringRecord) -> Result<RangeRecord, ImportError> {
    if row.len() != FEED_COLUMNS.len() {
        return Err(ImportError::ColumnCount {
            expected: FEED_COLUMNS.len(),
            found: row.len(),
        });
    }

    let ip_from = parse_key(&row[0], "ipFrom")?;
    let ip_to = parse_key(&row[1], "ipTo")?;
    if ip_from > ip_to {
        return Err(ImportError::InvertedRange {
            from: ip_from.value(),
            to: ip_to.value(),
        });
    }

    Ok(RangeRecord {
        ip_from,
        ip_to,
        country_code: row[2].to_string(),
        country_name: row[3].to_string(),
        region_name: row[4].to_string(),
        city_name: row[5].to_string(),
        latitude: parse_coordinate(&row[6], "latitude")?,
        longitude: parse_coordinate(&row[7], "longitude")?,
        zip_code: row[8].to_string(),
        time_zone: row[9].to_string(),
    })
}

/// Fields of `record` in feed column order.
pub fn feed_row(record: &RangeRecord) -> [String; 10] {
    [
        record.ip_from.to_string(),
        record.ip_to.to_string(),
        record.country_code.clone(),
        record.country_name.clone(),
        record.region_name.clone(),
        record.city_name.clone(),
        record.latitude.to_string(),
        record.longitude.to_string(),
        record.zip_code.clone(),
        record.time_zone.clone(),
    ]
}

fn parse_key(value: &str, column: &'static str) -> Result<AddressKey, ImportError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ImportError::InvalidKey {
            column,
            value: value.to_string(),
        });
    }
    trimmed.parse().map_err(|_| ImportError::InvalidKey {
        column,
        value: value.to_string(),
    })
}

fn parse_coordinate(value: &str, column: &'static str) -> Result<f64, ImportError> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ImportError::InvalidCoordinate {
            column,
            value: value.to_string(),
        }),
    }
}

fn is_header_row(row: &StringRecord) -> bool {
    row.get(0).map(str::trim) == Some(FEED_COLUMNS[0])
}

/// Streaming reader yielding the kept records of a feed file.
pub struct FeedReader {
    reader: Reader<File>,
    row: StringRecord,
    report: ImportReport,
    first_row: bool,
}

impl FeedReader {
    /// Opens `path` for reading; the header row, if any, is detected later.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open feed file: {}", path.display()))?;
        Ok(FeedReader {
            reader,
            row: StringRecord::new(),
            report: ImportReport::default(),
            first_row: true,
        })
    }

    /// Next record worth keeping, or `None` at end of file.
    ///
    /// Placeholder and malformed rows are counted and skipped. Only I/O
    /// failures end the pass with an error.
    pub fn next_record(&mut self) -> Result<Option<RangeRecord>> {
        loop {
            match self.reader.read_record(&mut self.row) {
                Ok(false) => return Ok(None),
                Ok(true) => {}
                Err(e) if e.is_io_error() => {
                    return Err(e).context("Failed to read feed file");
                }
                Err(e) => {
                    self.count_row();
                    self.report.malformed_rejected += 1;
                    warn!("Skipping unreadable feed row: {e}");
                    continue;
                }
            }

            if std::mem::take(&mut self.first_row) && is_header_row(&self.row) {
                debug!("Feed has a header row");
                continue;
            }

            self.count_row();
            match parse_feed_row(&self.row) {
                Ok(record) if record.is_placeholder() => {
                    self.report.placeholders_dropped += 1;
                }
                Ok(record) => return Ok(Some(record)),
                Err(e) => {
                    self.report.malformed_rejected += 1;
                    let line = self.row.position().map(|p| p.line()).unwrap_or(0);
                    warn!("Skipping malformed feed row at line {line}: {e}");
                }
            }
        }
    }

    fn count_row(&mut self) {
        self.report.rows_read += 1;
        if self.report.rows_read % IMPORT_PROGRESS_INTERVAL == 0 {
            info!("Processed {} rows...", self.report.rows_read);
        }
    }

    /// Counters so far; `rows_written` is left for the caller to fill in.
    pub fn into_report(self) -> ImportReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    fn feed_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    #[test]
    fn test_parse_valid_row() {
        let record = parse_feed_row(&row(&[
            "281470816487424",
            "281470816487679",
            "US",
            "United States of America",
            "California",
            "Mountain View",
            "37.405992",
            "-122.078515",
            "94043",
            "-07:00",
        ]))
        .unwrap();
        assert_eq!(record.ip_from.value(), 281_470_816_487_424);
        assert_eq!(record.ip_to.value(), 281_470_816_487_679);
        assert_eq!(record.city_name, "Mountain View");
        assert_eq!(record.latitude, 37.405992);
        assert_eq!(record.longitude, -122.078515);
        assert_eq!(record.time_zone, "-07:00");
    }

    #[test]
    fn test_parse_full_width_keys() {
        let max = u128::MAX.to_string();
        let max = max.as_str();
        let record =
            parse_feed_row(&row(&[max, max, "-", "-", "-", "-", "0", "0", "-", "-"])).unwrap();
        assert_eq!(record.ip_to.value(), u128::MAX);
    }

    #[test]
    fn test_parse_rejects_bad_rows() {
        let err = parse_feed_row(&row(&["1", "2", "US"])).unwrap_err();
        assert!(matches!(err, ImportError::ColumnCount { found: 3, .. }));

        let err = parse_feed_row(&row(&["x", "2", "-", "-", "-", "-", "0", "0", "-", "-"]))
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidKey { column: "ipFrom", .. }));

        let err = parse_feed_row(&row(&["-1", "2", "-", "-", "-", "-", "0", "0", "-", "-"]))
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidKey { .. }));

        let too_big = format!("{}0", u128::MAX);
        let err = parse_feed_row(&row(&["1", too_big.as_str(), "-", "-", "-", "-", "0", "0", "-", "-"]))
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidKey { column: "ipTo", .. }));

        let err = parse_feed_row(&row(&["9", "2", "-", "-", "-", "-", "0", "0", "-", "-"]))
            .unwrap_err();
        assert_eq!(err, ImportError::InvertedRange { from: 9, to: 2 });

        let err = parse_feed_row(&row(&["1", "2", "-", "-", "-", "-", "north", "0", "-", "-"]))
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidCoordinate { column: "latitude", .. }));

        let err = parse_feed_row(&row(&["1", "2", "-", "-", "-", "-", "0", "NaN", "-", "-"]))
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidCoordinate { column: "longitude", .. }));
    }

    #[test]
    fn test_feed_row_matches_column_order() {
        let fields = [
            "10", "20", "US", "United States", "Texas", "Austin", "30.26715", "-97.74306",
            "78701", "-05:00",
        ];
        let record = parse_feed_row(&row(&fields)).unwrap();
        assert_eq!(feed_row(&record), fields.map(String::from));
    }

    #[test]
    fn test_reader_drops_placeholders_and_keeps_partial_rows() {
        let file = feed_file(concat!(
            "\"0\",\"281470681743359\",\"-\",\"-\",\"-\",\"-\",\"0.000000\",\"0.000000\",\"-\",\"-\"\n",
            "\"281470681743360\",\"281470698520575\",\"US\",\"United States of America\",\"-\",\"-\",\"0.000000\",\"0.000000\",\"-\",\"-\"\n",
        ));
        let mut feed = FeedReader::open(file.path()).unwrap();

        let kept = feed.next_record().unwrap().expect("partial row should be kept");
        assert_eq!(kept.country_code, "US");
        assert_eq!(kept.city_name, "-");
        assert!(feed.next_record().unwrap().is_none());

        let report = feed.into_report();
        assert_eq!(report.rows_read, 2);
        assert_eq!(report.placeholders_dropped, 1);
        assert_eq!(report.malformed_rejected, 0);
    }

    #[test]
    fn test_reader_skips_header_and_malformed_rows() {
        let file = feed_file(concat!(
            "ipFrom,ipTo,countryCode,countryName,regionName,cityName,latitude,longitude,zipCode,timeZone\n",
            "10,5,US,United States,Texas,Austin,30.2,-97.7,78701,-05:00\n",
            "1,2,US\n",
            "20,30,US,United States,Texas,Austin,30.2,-97.7,78701,-05:00\n",
        ));
        let mut feed = FeedReader::open(file.path()).unwrap();

        let kept = feed.next_record().unwrap().unwrap();
        assert_eq!(kept.ip_from.value(), 20);
        assert!(feed.next_record().unwrap().is_none());

        let report = feed.into_report();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.malformed_rejected, 2);
    }

    #[test]
    fn test_reader_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = FeedReader::open(&dir.path().join("missing.csv"));
        assert!(result.is_err());
    }
}
