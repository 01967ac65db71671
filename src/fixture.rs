//! Synthetic row generation and the fixture write pipeline.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{
    FIXTURE_RECORDS, FIXTURE_ROWS, FLOAT_LIST_LEN, SMALL_INT_MAX, TOKEN_ALPHABET, TOKEN_LEN,
    TOKEN_LIST_LEN,
};
use crate::proto::encode_example;
use crate::record::{record_from_row, Row, RowValue};
use crate::tfrecord::RecordWriter;

/// Summary of one fixture run.
#[derive(Debug, Clone)]
pub struct FixtureReport {
    /// Rows generated in memory.
    pub rows_generated: usize,
    /// Records serialized to the output file.
    pub records_written: usize,
    /// Container bytes written, framing included.
    pub bytes_written: u64,
    /// Output file path.
    pub path: PathBuf,
}

/// Returns a token of [`TOKEN_LEN`] distinct lowercase letters in random
/// order.
pub fn random_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut letters = TOKEN_ALPHABET;
    letters.shuffle(rng);
    letters[..TOKEN_LEN].iter().collect()
}

/// One value per row for each of the five generated fields.
struct FixtureColumns {
    ids: Vec<String>,
    unit_floats: Vec<f32>,
    small_ints: Vec<i64>,
    float_lists: Vec<Vec<f32>>,
    token_lists: Vec<Vec<String>>,
}

fn generate_columns<R: Rng + ?Sized>(rng: &mut R, rows: usize) -> FixtureColumns {
    let mut ids = Vec::with_capacity(rows);
    let mut unit_floats = Vec::with_capacity(rows);
    // The integer column carries a leading sentinel 1, so row i reads the
    // value drawn for row i-1 and row 0 always reads 1. Downstream
    // consumers rely on this alignment; keep it.
    let mut small_ints = Vec::with_capacity(rows + 1);
    small_ints.push(1);
    let mut float_lists = Vec::with_capacity(rows);
    let mut token_lists = Vec::with_capacity(rows);

    for index in 0..rows {
        ids.push(index.to_string());
        unit_floats.push(rng.random::<f32>());
        small_ints.push(rng.random_range(0..=SMALL_INT_MAX));
        float_lists.push((0..FLOAT_LIST_LEN).map(|_| rng.random::<f32>()).collect());
        token_lists.push((0..TOKEN_LIST_LEN).map(|_| random_token(rng)).collect());
    }

    FixtureColumns {
        ids,
        unit_floats,
        small_ints,
        float_lists,
        token_lists,
    }
}

fn row_at(columns: &FixtureColumns, index: usize) -> Row {
    let mut row = Row::new();
    row.insert("d_s_id".to_string(), RowValue::Str(columns.ids[index].clone()));
    row.insert("d_s_1".to_string(), RowValue::Float(columns.unit_floats[index]));
    row.insert("d_s_2".to_string(), RowValue::Int(columns.small_ints[index]));
    row.insert(
        "d_s_3".to_string(),
        RowValue::List(columns.float_lists[index].iter().copied().map(RowValue::Float).collect()),
    );
    row.insert(
        "d_s_4".to_string(),
        RowValue::List(columns.token_lists[index].iter().cloned().map(RowValue::Str).collect()),
    );
    row
}

/// Generates [`FIXTURE_ROWS`] synthetic rows and writes the first
/// [`FIXTURE_RECORDS`] of them to `path` as container records.
///
/// An existing file at `path` is truncated. Failures are fatal to the
/// run: the first write error propagates and nothing is retried.
pub fn write_fixture<R: Rng + ?Sized>(path: &Path, rng: &mut R) -> Result<FixtureReport> {
    info!("Generating {FIXTURE_ROWS} synthetic rows");
    let columns = generate_columns(rng, FIXTURE_ROWS);

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = RecordWriter::new(BufWriter::new(file));

    for index in 0..FIXTURE_RECORDS {
        let record = record_from_row(&row_at(&columns, index));
        let mut payload = Vec::new();
        encode_example(&record, &mut payload);
        writer
            .write_record(&payload)
            .with_context(|| format!("Failed to write record {index}"))?;
    }
    writer.flush().context("Failed to flush output file")?;

    debug!(
        "Wrote {} records ({} container bytes) to {}",
        FIXTURE_RECORDS,
        writer.bytes_written(),
        path.display()
    );
    Ok(FixtureReport {
        rows_generated: FIXTURE_ROWS,
        records_written: FIXTURE_RECORDS,
        bytes_written: writer.bytes_written(),
        path: path.to_path_buf(),
    })
}
