//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geoip_ranges` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use geoip_ranges::config::{Cli, Command};
use geoip_ranges::import::ImportReport;
use geoip_ranges::initialization::init_logger_with;
use geoip_ranges::{run_convert, run_import, run_lookup, run_server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from the current directory, then from next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = dispatch(cli).await {
        eprintln!("geoip_ranges error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve(cmd) => run_server(cmd.into_config()).await,
        Command::Import(cmd) => {
            let report = run_import(&cmd.input, &cmd.db_path, cmd.replace).await?;
            print_report("Imported", &report);
            if report.existing_ranges > 0 {
                println!("Appended to {} ranges already stored", report.existing_ranges);
            }
            println!("Ranges saved in {}", cmd.db_path.display());
            Ok(())
        }
        Command::Convert(cmd) => {
            let report = run_convert(&cmd.input, &cmd.output)?;
            print_report("Converted", &report);
            println!("Filtered feed written to {}", cmd.output.display());
            Ok(())
        }
        Command::Lookup(cmd) => {
            let result = run_lookup(&cmd.ip, &cmd.db_path).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

fn print_report(verb: &str, report: &ImportReport) {
    println!(
        "{} {} range{} ({} rows read, {} placeholders dropped, {} malformed)",
        verb,
        report.rows_written,
        if report.rows_written == 1 { "" } else { "s" },
        report.rows_read,
        report.placeholders_dropped,
        report.malformed_rejected
    );
}
