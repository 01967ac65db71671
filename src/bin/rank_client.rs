//! Ranking endpoint smoke-test entry point.
//!
//! This is a thin wrapper around the `rank_testkit` library that handles:
//! - Logger and HTTP client initialization
//! - Exit status
//!
//! The request itself, and what gets printed, live in the library crate.
//! An unreachable service is reported but is not a failure exit; a
//! response that is not JSON is.

use std::process;

use anyhow::{Context, Result};

use rank_testkit::config::DEFAULT_BASE_URL;
use rank_testkit::initialization::{init_client, init_logger};
use rank_testkit::{post_rank, sample_request};

#[tokio::main]
async fn main() -> Result<()> {
    init_logger().context("Failed to initialize logger")?;
    let client = init_client().context("Failed to initialize HTTP client")?;

    let request = sample_request();
    match post_rank(&client, DEFAULT_BASE_URL, &request).await {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("rank_client error: {:#}", e);
            process::exit(1);
        }
    }
}
