//! Length-prefixed, checksummed record container framing.
//!
//! Files in this format hold a flat sequence of byte payloads. Each
//! record is framed the way TFRecord files lay it out:
//!
//! ```text
//! length      u64 little-endian                   (8 bytes)
//! length CRC  masked CRC32C of the length bytes   (4 bytes, LE)
//! payload     length bytes
//! data CRC    masked CRC32C of the payload        (4 bytes, LE)
//! ```
//!
//! The checksum is CRC32C (Castagnoli) run through the container's mask:
//! `masked(crc) = rotr15(crc) + 0xa282ead8`, wrapping.

use std::io::{ErrorKind, Read, Write};

use crc32c::crc32c;

use crate::error_handling::RecordError;

/// Mask constant added to the rotated CRC.
const MASK_DELTA: u32 = 0xa282_ead8;

/// Hard ceiling on a single payload. Anything above this in a length
/// prefix is treated as corruption rather than allocated.
const MAX_PAYLOAD_LEN: u64 = 64 * 1024 * 1024;

/// Masked CRC32C over `bytes`.
pub fn masked_crc32c(bytes: &[u8]) -> u32 {
    crc32c(bytes).rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Streaming writer that frames payloads into the container layout.
pub struct RecordWriter<W: Write> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> RecordWriter<W> {
    /// Wraps `inner`. Callers writing to a file usually hand in a
    /// `BufWriter`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Appends one record: length prefix, length checksum, payload,
    /// payload checksum.
    pub fn write_record(&mut self, payload: &[u8]) -> Result<(), RecordError> {
        let length_bytes = (payload.len() as u64).to_le_bytes();
        self.inner.write_all(&length_bytes)?;
        self.inner.write_all(&masked_crc32c(&length_bytes).to_le_bytes())?;
        self.inner.write_all(payload)?;
        self.inner.write_all(&masked_crc32c(payload).to_le_bytes())?;
        self.bytes_written += 16 + payload.len() as u64;
        Ok(())
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<(), RecordError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Container bytes written so far, framing included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Unwraps the inner writer without flushing it.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Streaming reader for the container layout. Both checksums are
/// verified on every record.
pub struct RecordReader<R: Read> {
    inner: R,
}

impl<R: Read> RecordReader<R> {
    /// Wraps `inner`. Callers reading a file usually hand in a
    /// `BufReader`.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads the next payload, or `Ok(None)` at a clean end of stream.
    ///
    /// # Errors
    ///
    /// [`RecordError::Truncated`] when the stream ends inside a record,
    /// [`RecordError::ChecksumMismatch`] when a stored CRC disagrees with
    /// the bytes read, and [`RecordError::Oversized`] when the length
    /// prefix exceeds the 64 MiB payload ceiling.
    pub fn read_record(&mut self) -> Result<Option<Vec<u8>>, RecordError> {
        let mut length_bytes = [0u8; 8];
        if !self.fill(&mut length_bytes, true)? {
            return Ok(None);
        }
        let mut crc_bytes = [0u8; 4];
        self.fill(&mut crc_bytes, false)?;
        let stored = u32::from_le_bytes(crc_bytes);
        let computed = masked_crc32c(&length_bytes);
        if stored != computed {
            return Err(RecordError::ChecksumMismatch {
                section: "length",
                stored,
                computed,
            });
        }

        let length = u64::from_le_bytes(length_bytes);
        if length > MAX_PAYLOAD_LEN {
            return Err(RecordError::Oversized(length));
        }

        let mut payload = vec![0u8; length as usize];
        self.fill(&mut payload, false)?;
        let mut crc_bytes = [0u8; 4];
        self.fill(&mut crc_bytes, false)?;
        let stored = u32::from_le_bytes(crc_bytes);
        let computed = masked_crc32c(&payload);
        if stored != computed {
            return Err(RecordError::ChecksumMismatch {
                section: "payload",
                stored,
                computed,
            });
        }

        Ok(Some(payload))
    }

    /// Reads every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<Vec<u8>>, RecordError> {
        let mut records = Vec::new();
        while let Some(payload) = self.read_record()? {
            records.push(payload);
        }
        Ok(records)
    }

    /// Fills `buf` completely. With `eof_ok`, a stream that ends before
    /// the first byte yields `Ok(false)`; running out anywhere else is a
    /// truncation error.
    fn fill(&mut self, buf: &mut [u8], eof_ok: bool) -> Result<bool, RecordError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    if eof_ok && filled == 0 {
                        return Ok(false);
                    }
                    return Err(RecordError::Truncated("stream ended inside a record"));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(RecordError::Io(e)),
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payloads: &[&[u8]]) -> Vec<u8> {
        let mut writer = RecordWriter::new(Vec::new());
        for payload in payloads {
            writer.write_record(payload).unwrap();
        }
        writer.into_inner()
    }

    #[test]
    fn test_masked_crc_of_empty_input_is_the_mask_delta() {
        // CRC32C of no bytes is zero, so only the mask remains.
        assert_eq!(masked_crc32c(&[]), 0xa282_ead8);
    }

    #[test]
    fn test_writer_emits_the_documented_layout() {
        let bytes = frame(&[b"abc"]);
        assert_eq!(bytes.len(), 8 + 4 + 3 + 4);
        assert_eq!(&bytes[..8], &3u64.to_le_bytes());
        assert_eq!(&bytes[8..12], &masked_crc32c(&3u64.to_le_bytes()).to_le_bytes());
        assert_eq!(&bytes[12..15], b"abc");
        assert_eq!(&bytes[15..], &masked_crc32c(b"abc").to_le_bytes());
    }

    #[test]
    fn test_bytes_written_matches_the_output() {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_record(b"first").unwrap();
        writer.write_record(b"second record").unwrap();
        assert_eq!(writer.bytes_written(), writer.into_inner().len() as u64);
    }

    #[test]
    fn test_round_trips_multiple_records() {
        let payloads: [&[u8]; 3] = [b"one", b"", b"three-33"];
        let bytes = frame(&payloads);
        let mut reader = RecordReader::new(bytes.as_slice());
        let records = reader.read_all().unwrap();
        assert_eq!(records, payloads.map(|p| p.to_vec()));
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_empty_stream_reads_as_no_records() {
        let mut reader = RecordReader::new([].as_slice());
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_payload_byte_is_detected() {
        let mut bytes = frame(&[b"payload"]);
        bytes[13] ^= 0xff;
        let mut reader = RecordReader::new(bytes.as_slice());
        match reader.read_record() {
            Err(RecordError::ChecksumMismatch { section, .. }) => assert_eq!(section, "payload"),
            other => panic!("expected payload checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_length_prefix_is_detected() {
        let mut bytes = frame(&[b"payload"]);
        bytes[0] ^= 0x01;
        let mut reader = RecordReader::new(bytes.as_slice());
        match reader.read_record() {
            Err(RecordError::ChecksumMismatch { section, .. }) => assert_eq!(section, "length"),
            other => panic!("expected length checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_stored_crc_is_detected() {
        let mut bytes = frame(&[b"payload"]);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let mut reader = RecordReader::new(bytes.as_slice());
        assert!(matches!(
            reader.read_record(),
            Err(RecordError::ChecksumMismatch { section: "payload", .. })
        ));
    }

    #[test]
    fn test_truncated_record_is_detected() {
        let bytes = frame(&[b"payload"]);
        let mut reader = RecordReader::new(&bytes[..bytes.len() - 2]);
        assert!(matches!(reader.read_record(), Err(RecordError::Truncated(_))));
    }

    #[test]
    fn test_truncated_header_is_detected() {
        let bytes = frame(&[b"payload"]);
        // Five bytes cannot even hold the length prefix.
        let mut reader = RecordReader::new(&bytes[..5]);
        assert!(matches!(reader.read_record(), Err(RecordError::Truncated(_))));
    }

    #[test]
    fn test_oversized_length_is_rejected_before_allocation() {
        let length_bytes = (MAX_PAYLOAD_LEN + 1).to_le_bytes();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&length_bytes);
        bytes.extend_from_slice(&masked_crc32c(&length_bytes).to_le_bytes());
        let mut reader = RecordReader::new(bytes.as_slice());
        match reader.read_record() {
            Err(RecordError::Oversized(length)) => assert_eq!(length, MAX_PAYLOAD_LEN + 1),
            other => panic!("expected oversized error, got {other:?}"),
        }
    }

    #[test]
    fn test_second_record_corruption_leaves_the_first_readable() {
        let mut bytes = frame(&[b"good", b"bad"]);
        let second_payload = 8 + 4 + 4 + 4 + 8 + 4;
        bytes[second_payload] ^= 0xff;
        let mut reader = RecordReader::new(bytes.as_slice());
        assert_eq!(reader.read_record().unwrap(), Some(b"good".to_vec()));
        assert!(matches!(
            reader.read_record(),
            Err(RecordError::ChecksumMismatch { .. })
        ));
    }
}
