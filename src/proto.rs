//! Wire codec for record payloads.
//!
//! A payload is an `Example` message in the protobuf encoding that
//! TFRecord training pipelines consume. The message tree is small and
//! fixed, so the codec is written directly against it:
//!
//! ```text
//! Example                          Feature
//!   field 1: Features  (len)         field 1: BytesList  (len)
//! Features                           field 2: FloatList  (len)
//!   field 1: map entry (len, rep)    field 3: Int64List  (len)
//! map entry                        BytesList
//!   field 1: key       (len)         field 1: bytes      (len, rep)
//!   field 2: Feature   (len)       FloatList
//!                                    field 1: f32, packed little-endian
//!                                  Int64List
//!                                    field 1: base-128 varints, packed
//! ```
//!
//! Encoding always packs the numeric lists. Decoding also accepts the
//! unpacked forms (wire types 5 and 0) and skips unknown fields, as
//! protobuf readers must.

use crate::error_handling::RecordError;
use crate::record::{Feature, Record};

// Protobuf wire types.
const WIRE_VARINT: u64 = 0;
const WIRE_FIXED64: u64 = 1;
const WIRE_LEN: u64 = 2;
const WIRE_FIXED32: u64 = 5;

// Field numbers, per the message tree above.
const EXAMPLE_FEATURES: u64 = 1;
const FEATURES_MAP_ENTRY: u64 = 1;
const MAP_KEY: u64 = 1;
const MAP_VALUE: u64 = 2;
const FEATURE_BYTES_LIST: u64 = 1;
const FEATURE_FLOAT_LIST: u64 = 2;
const FEATURE_INT64_LIST: u64 = 3;
const LIST_VALUE: u64 = 1;

/// Longest legal varint for a u64: ten 7-bit groups.
const MAX_VARINT_BYTES: usize = 10;

/// Serializes a record into `buf` as one `Example` message.
pub fn encode_example(record: &Record, buf: &mut Vec<u8>) {
    let mut features = Vec::new();
    for (name, feature) in record {
        let mut entry = Vec::new();
        put_bytes(MAP_KEY, name.as_bytes(), &mut entry);
        put_bytes(MAP_VALUE, &encode_feature(feature), &mut entry);
        put_bytes(FEATURES_MAP_ENTRY, &entry, &mut features);
    }
    put_bytes(EXAMPLE_FEATURES, &features, buf);
}

/// Deserializes one `Example` message back into a record.
///
/// Duplicate feature names keep the last occurrence, matching protobuf
/// map semantics. A feature without a recognized kind, a torn varint or
/// length field, a non-UTF-8 key, or an unsupported wire type is a
/// [`RecordError::MalformedPayload`].
pub fn decode_example(bytes: &[u8]) -> Result<Record, RecordError> {
    let mut record = Record::new();
    let mut reader = FieldReader::new(bytes);
    while let Some((field, wire)) = reader.next_tag()? {
        if field == EXAMPLE_FEATURES && wire == WIRE_LEN {
            decode_features(reader.bytes()?, &mut record)?;
        } else {
            reader.skip(wire)?;
        }
    }
    Ok(record)
}

fn encode_feature(feature: &Feature) -> Vec<u8> {
    let mut list = Vec::new();
    let field = match feature {
        Feature::Bytes(values) => {
            for value in values {
                put_bytes(LIST_VALUE, value, &mut list);
            }
            FEATURE_BYTES_LIST
        }
        Feature::Floats(values) => {
            let mut packed = Vec::with_capacity(values.len() * 4);
            for value in values {
                packed.extend_from_slice(&value.to_le_bytes());
            }
            put_bytes(LIST_VALUE, &packed, &mut list);
            FEATURE_FLOAT_LIST
        }
        Feature::Ints(values) => {
            let mut packed = Vec::new();
            for value in values {
                // Negative values take the full ten bytes, per int64 rules.
                put_varint(*value as u64, &mut packed);
            }
            put_bytes(LIST_VALUE, &packed, &mut list);
            FEATURE_INT64_LIST
        }
    };
    let mut feature_buf = Vec::new();
    put_bytes(field, &list, &mut feature_buf);
    feature_buf
}

fn decode_features(bytes: &[u8], record: &mut Record) -> Result<(), RecordError> {
    let mut reader = FieldReader::new(bytes);
    while let Some((field, wire)) = reader.next_tag()? {
        if field == FEATURES_MAP_ENTRY && wire == WIRE_LEN {
            let (name, feature) = decode_map_entry(reader.bytes()?)?;
            record.insert(name, feature);
        } else {
            reader.skip(wire)?;
        }
    }
    Ok(())
}

fn decode_map_entry(bytes: &[u8]) -> Result<(String, Feature), RecordError> {
    let mut reader = FieldReader::new(bytes);
    let mut name = None;
    let mut feature = None;
    while let Some((field, wire)) = reader.next_tag()? {
        match (field, wire) {
            (MAP_KEY, WIRE_LEN) => {
                let key = std::str::from_utf8(reader.bytes()?)
                    .map_err(|_| malformed("feature name is not UTF-8"))?;
                name = Some(key.to_string());
            }
            (MAP_VALUE, WIRE_LEN) => {
                feature = Some(decode_feature(reader.bytes()?)?);
            }
            _ => reader.skip(wire)?,
        }
    }
    match (name, feature) {
        (Some(name), Some(feature)) => Ok((name, feature)),
        _ => Err(malformed("map entry missing its key or value")),
    }
}

fn decode_feature(bytes: &[u8]) -> Result<Feature, RecordError> {
    let mut reader = FieldReader::new(bytes);
    let mut feature = None;
    while let Some((field, wire)) = reader.next_tag()? {
        match field {
            FEATURE_BYTES_LIST if wire == WIRE_LEN => {
                feature = Some(Feature::Bytes(decode_bytes_list(reader.bytes()?)?));
            }
            FEATURE_FLOAT_LIST if wire == WIRE_LEN => {
                feature = Some(Feature::Floats(decode_float_list(reader.bytes()?)?));
            }
            FEATURE_INT64_LIST if wire == WIRE_LEN => {
                feature = Some(Feature::Ints(decode_int64_list(reader.bytes()?)?));
            }
            _ => reader.skip(wire)?,
        }
    }
    feature.ok_or_else(|| malformed("feature carries no recognized kind"))
}

fn decode_bytes_list(bytes: &[u8]) -> Result<Vec<Vec<u8>>, RecordError> {
    let mut reader = FieldReader::new(bytes);
    let mut values = Vec::new();
    while let Some((field, wire)) = reader.next_tag()? {
        if field == LIST_VALUE && wire == WIRE_LEN {
            values.push(reader.bytes()?.to_vec());
        } else {
            reader.skip(wire)?;
        }
    }
    Ok(values)
}

fn decode_float_list(bytes: &[u8]) -> Result<Vec<f32>, RecordError> {
    let mut reader = FieldReader::new(bytes);
    let mut values = Vec::new();
    while let Some((field, wire)) = reader.next_tag()? {
        match (field, wire) {
            (LIST_VALUE, WIRE_LEN) => {
                let packed = reader.bytes()?;
                if packed.len() % 4 != 0 {
                    return Err(malformed("packed float data is not a multiple of 4 bytes"));
                }
                for chunk in packed.chunks_exact(4) {
                    values.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
                }
            }
            (LIST_VALUE, WIRE_FIXED32) => {
                values.push(f32::from_le_bytes(reader.fixed32()?));
            }
            _ => reader.skip(wire)?,
        }
    }
    Ok(values)
}

fn decode_int64_list(bytes: &[u8]) -> Result<Vec<i64>, RecordError> {
    let mut reader = FieldReader::new(bytes);
    let mut values = Vec::new();
    while let Some((field, wire)) = reader.next_tag()? {
        match (field, wire) {
            (LIST_VALUE, WIRE_LEN) => {
                let mut packed = FieldReader::new(reader.bytes()?);
                while !packed.at_end() {
                    values.push(packed.varint()? as i64);
                }
            }
            (LIST_VALUE, WIRE_VARINT) => {
                values.push(reader.varint()? as i64);
            }
            _ => reader.skip(wire)?,
        }
    }
    Ok(values)
}

fn put_tag(field: u64, wire_type: u64, buf: &mut Vec<u8>) {
    put_varint(field << 3 | wire_type, buf);
}

fn put_bytes(field: u64, bytes: &[u8], buf: &mut Vec<u8>) {
    put_tag(field, WIRE_LEN, buf);
    put_varint(bytes.len() as u64, buf);
    buf.extend_from_slice(bytes);
}

fn put_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

fn malformed(what: &str) -> RecordError {
    RecordError::MalformedPayload(what.to_string())
}

/// Cursor over one message's bytes.
struct FieldReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Next (field number, wire type) pair, or `None` at the end of the
    /// message.
    fn next_tag(&mut self) -> Result<Option<(u64, u64)>, RecordError> {
        if self.at_end() {
            return Ok(None);
        }
        let tag = self.varint()?;
        let field = tag >> 3;
        if field == 0 {
            return Err(malformed("field number 0"));
        }
        Ok(Some((field, tag & 0x7)))
    }

    fn varint(&mut self) -> Result<u64, RecordError> {
        let mut value: u64 = 0;
        let mut shift = 0;
        for i in 0..MAX_VARINT_BYTES {
            let Some(&byte) = self.bytes.get(self.pos + i) else {
                return Err(malformed("varint runs past the end of the buffer"));
            };
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                self.pos += i + 1;
                return Ok(value);
            }
            shift += 7;
        }
        Err(malformed("varint longer than ten bytes"))
    }

    /// Length-delimited chunk: a length varint followed by that many bytes.
    fn bytes(&mut self) -> Result<&'a [u8], RecordError> {
        let len = self.varint()?;
        if len > (self.bytes.len() - self.pos) as u64 {
            return Err(malformed("length-delimited field runs past the end of the buffer"));
        }
        let end = self.pos + len as usize;
        let chunk = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(chunk)
    }

    fn fixed32(&mut self) -> Result<[u8; 4], RecordError> {
        let Some(chunk) = self.bytes.get(self.pos..self.pos + 4) else {
            return Err(malformed("fixed32 field runs past the end of the buffer"));
        };
        self.pos += 4;
        Ok([chunk[0], chunk[1], chunk[2], chunk[3]])
    }

    fn skip(&mut self, wire: u64) -> Result<(), RecordError> {
        match wire {
            WIRE_VARINT => {
                self.varint()?;
            }
            WIRE_FIXED64 => self.advance(8)?,
            WIRE_LEN => {
                self.bytes()?;
            }
            WIRE_FIXED32 => self.advance(4)?,
            _ => return Err(malformed("unsupported wire type")),
        }
        Ok(())
    }

    fn advance(&mut self, count: usize) -> Result<(), RecordError> {
        if self.bytes.len() - self.pos < count {
            return Err(malformed("field runs past the end of the buffer"));
        }
        self.pos += count;
        Ok(())
    }
}
