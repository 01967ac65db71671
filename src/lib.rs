//! rank_testkit library: fixture generation and a ranking smoke client.
//!
//! Two small tools share this crate:
//!
//! - `tfrecord_gen` synthesizes rows of typed values and writes the first
//!   slice of them to a length-prefixed, checksummed record container
//!   file for training-pipeline consumers.
//! - `rank_client` posts one canned JSON request to a ranking service and
//!   prints the exchange.
//!
//! The tools are independent: the record path never touches HTTP and the
//! rank path never touches the record format.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use rank_testkit::write_fixture;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut rng = rand::rng();
//! let report = write_fixture(Path::new("test.tfrecord"), &mut rng)?;
//! println!("{} records, {} bytes", report.records_written, report.bytes_written);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
mod error_handling;
mod fixture;
pub mod initialization;
mod proto;
mod rank;
mod record;
mod tfrecord;

// Re-export public API
pub use error_handling::RecordError;
pub use fixture::{random_token, write_fixture, FixtureReport};
pub use proto::{decode_example, encode_example};
pub use rank::{
    post_rank, sample_request, FeatureCode, FeatureColumn, FeatureValues, RankEntry, RankRequest,
};
pub use record::{record_from_row, Feature, Record, Row, RowValue};
pub use tfrecord::{masked_crc32c, RecordReader, RecordWriter};
