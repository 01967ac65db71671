//! Default configuration constants for the two tools.
//!
//! There is no command-line parser: library functions take these values
//! as explicit parameters and the binaries pass the defaults below.

use std::time::Duration;

// Fixture generation defaults
/// Default output path for the generated record file.
pub const DEFAULT_OUTPUT_PATH: &str = "test.tfrecord";
/// Synthetic rows generated in memory per run.
pub const FIXTURE_ROWS: usize = 10_000;
/// Generated rows actually serialized to the output file.
pub const FIXTURE_RECORDS: usize = 100;

// Row shape
/// Elements in each row's float list (`d_s_3`).
pub const FLOAT_LIST_LEN: usize = 20;
/// Elements in each row's token list (`d_s_4`).
pub const TOKEN_LIST_LEN: usize = 20;
/// Characters in one random token.
pub const TOKEN_LEN: usize = 23;
/// Inclusive upper bound for the `d_s_2` integer draw.
pub const SMALL_INT_MAX: i64 = 100;

/// Alphabet tokens draw from, without replacement.
pub const TOKEN_ALPHABET: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

// Ranking endpoint defaults
/// Default ranking service to probe.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9528";
/// Endpoint path, appended verbatim to the base URL.
pub const RANK_ENDPOINT_PATH: &str = "/api/v1/rank";
/// Per-request timeout for the ranking call.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
