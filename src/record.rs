//! Typed row values and their tagged wire form.
//!
//! A [`Row`] is what the generator produces: named values of whatever
//! shape the source data happens to have. A [`Record`] is what goes on
//! the wire: only the recognized fields, each tagged as one of the three
//! list kinds the payload format supports.

use std::collections::BTreeMap;

/// A synthetic input value before serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// UTF-8 string.
    Str(String),
    /// 64-bit signed integer.
    Int(i64),
    /// 32-bit float.
    Float(f32),
    /// Boolean. Not representable on the wire; always dropped.
    Bool(bool),
    /// Missing value. Not representable on the wire; always dropped.
    Null,
    /// List of values. Recognized only when non-empty and homogeneous
    /// over one of the three scalar kinds.
    List(Vec<RowValue>),
}

/// A tagged wire value.
///
/// Scalars are stored as one-element lists, which is how the payload
/// format represents them.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    /// UTF-8 strings, stored as raw bytes.
    Bytes(Vec<Vec<u8>>),
    /// 32-bit floats.
    Floats(Vec<f32>),
    /// 64-bit signed integers.
    Ints(Vec<i64>),
}

/// A named mapping of input values, as produced by the generator.
pub type Row = BTreeMap<String, RowValue>;

/// The serializable form of a [`Row`]: recognized fields only, each as a
/// tagged [`Feature`]. The sorted map keeps serialization deterministic.
pub type Record = BTreeMap<String, Feature>;

impl Feature {
    /// Converts one input value to its tagged wire form.
    ///
    /// Strings, integers and floats become one-element lists of their
    /// kind; homogeneous lists of those scalars keep their elements.
    /// Everything else (booleans, nulls, empty lists, mixed lists,
    /// nested lists) yields `None` and the caller omits the field.
    pub fn from_value(value: &RowValue) -> Option<Feature> {
        match value {
            RowValue::Str(s) => Some(Feature::Bytes(vec![s.clone().into_bytes()])),
            RowValue::Int(n) => Some(Feature::Ints(vec![*n])),
            RowValue::Float(x) => Some(Feature::Floats(vec![*x])),
            RowValue::List(items) => Feature::from_list(items),
            RowValue::Bool(_) | RowValue::Null => None,
        }
    }

    /// List conversion. The first element fixes the expected kind; any
    /// element of a different kind rejects the whole list.
    fn from_list(items: &[RowValue]) -> Option<Feature> {
        match items.first()? {
            RowValue::Str(_) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        RowValue::Str(s) => values.push(s.clone().into_bytes()),
                        _ => return None,
                    }
                }
                Some(Feature::Bytes(values))
            }
            RowValue::Int(_) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        RowValue::Int(n) => values.push(*n),
                        _ => return None,
                    }
                }
                Some(Feature::Ints(values))
            }
            RowValue::Float(_) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        RowValue::Float(x) => values.push(*x),
                        _ => return None,
                    }
                }
                Some(Feature::Floats(values))
            }
            RowValue::Bool(_) | RowValue::Null | RowValue::List(_) => None,
        }
    }

    /// Number of elements in the value list.
    pub fn len(&self) -> usize {
        match self {
            Feature::Bytes(values) => values.len(),
            Feature::Floats(values) => values.len(),
            Feature::Ints(values) => values.len(),
        }
    }

    /// True when the value list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds a [`Record`] from a row, keeping only the recognized fields.
pub fn record_from_row(row: &Row) -> Record {
    row.iter()
        .filter_map(|(name, value)| Feature::from_value(value).map(|feature| (name.clone(), feature)))
        .collect()
}
