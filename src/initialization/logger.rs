//! Logger initialization.
//!
//! `env_logger` backend with two output formats: colored plain text for
//! terminals and one JSON object per line for log shippers.

use std::io::Write;

use colored::*;
use log::{Level, LevelFilter, Record};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependency modules whose debug output drowns out ours.
const NOISY_MODULES: [(&str, LevelFilter); 3] = [
    ("sqlx", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("tower_http", LevelFilter::Info),
];

/// Initializes the global logger with the given level and format.
///
/// `RUST_LOG` is read first and `level` is applied on top of it, so
/// `RUST_LOG=geoip_ranges::storage=trace` still narrows output while the CLI
/// `--log-level` sets the baseline.
///
/// ```bash
/// RUST_LOG=sqlx=debug geoip_ranges --log-level info serve
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already
/// installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    logger_builder(level, format).try_init()?;
    Ok(())
}

fn logger_builder(level: LevelFilter, format: LogFormat) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, cap) in NOISY_MODULES {
        builder.filter_module(module, cap.min(level));
    }
    builder.filter_module("geoip_ranges", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(chrono::Utc::now().timestamp_millis(), record)
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    record.target().cyan(),
                    colored_level(record.level()),
                    record.args()
                )
            });
        }
    }
    builder
}

fn colored_level(level: Level) -> ColoredString {
    let text = level.to_string();
    match level {
        Level::Error => text.red().bold(),
        Level::Warn => text.yellow(),
        Level::Info => text.green(),
        Level::Debug => text.blue(),
        Level::Trace => text.purple(),
    }
}

fn json_line(ts_millis: i64, record: &Record<'_>) -> String {
    serde_json::json!({
        "ts": ts_millis,
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
    .to_string()
}
