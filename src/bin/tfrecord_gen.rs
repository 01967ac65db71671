//! Fixture generator entry point.
//!
//! This is a thin wrapper around the `rank_testkit` library that handles:
//! - Logger initialization
//! - User-facing output formatting
//!
//! All generation and serialization logic lives in the library crate.

use std::path::Path;
use std::process;

use anyhow::{Context, Result};

use rank_testkit::config::DEFAULT_OUTPUT_PATH;
use rank_testkit::initialization::init_logger;
use rank_testkit::write_fixture;

fn main() -> Result<()> {
    init_logger().context("Failed to initialize logger")?;

    let mut rng = rand::rng();
    match write_fixture(Path::new(DEFAULT_OUTPUT_PATH), &mut rng) {
        Ok(report) => {
            println!(
                "✅ Wrote {} record{} ({} bytes) to {} from {} generated rows",
                report.records_written,
                if report.records_written == 1 { "" } else { "s" },
                report.bytes_written,
                report.path.display(),
                report.rows_generated
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("tfrecord_gen error: {:#}", e);
            process::exit(1);
        }
    }
}
