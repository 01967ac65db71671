//! Process-level initialization shared by the binaries.

use env_logger::Env;
use log::SetLoggerError;

use crate::config::HTTP_TIMEOUT;

/// Initializes the process logger.
///
/// Defaults to `info`; `RUST_LOG` overrides it (for example
/// `RUST_LOG=debug`).
pub fn init_logger() -> Result<(), SetLoggerError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init()
}

/// Builds the HTTP client for the ranking call, carrying the
/// [`HTTP_TIMEOUT`] per-request timeout. There are no retries.
pub fn init_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::ClientBuilder::new().timeout(HTTP_TIMEOUT).build()
}
