//! Position tapes.
//!
//! A [`Tape`] is an ordered list of primitive fields. Stages append their
//! resumption state with [`Tape::record`] and read it back, in the same
//! order, with [`Tape::read`]. The tape never interprets its contents; the
//! recording order is the only schema.
//!
//! ```rust
//! use datapipe::tape::Tape;
//!
//! let mut tape = Tape::new();
//! tape.record(3_u64);
//! tape.record(true);
//!
//! tape.rewind();
//! assert_eq!(tape.read::<u64>().unwrap(), 3);
//! assert!(tape.read::<bool>().unwrap());
//! assert!(tape.is_exhausted());
//! ```

use rkyv::rancor;
use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize};

use crate::error::TapeError;

/// A single primitive field on a tape.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub enum TapeValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer (counters, offsets).
    UInt(u64),
    /// Floating point value.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes; also used to embed an encoded sub-tape.
    Bytes(Vec<u8>),
}

impl TapeValue {
    /// Name of the field type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
        }
    }
}

/// A type that can be stored as a tape field.
pub trait TapeField: Sized {
    /// Field type name, matching [`TapeValue::type_name`].
    const TYPE_NAME: &'static str;

    /// Convert into a tape value.
    fn into_value(self) -> TapeValue;

    /// Convert back from a tape value, or hand the value back on mismatch.
    fn from_value(value: TapeValue) -> std::result::Result<Self, TapeValue>;
}

macro_rules! impl_tape_field {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl TapeField for $ty {
            const TYPE_NAME: &'static str = $name;

            fn into_value(self) -> TapeValue {
                TapeValue::$variant(self)
            }

            fn from_value(value: TapeValue) -> std::result::Result<Self, TapeValue> {
                match value {
                    TapeValue::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

impl_tape_field!(bool, Bool, "bool");
impl_tape_field!(i64, Int, "int");
impl_tape_field!(u64, UInt, "uint");
impl_tape_field!(f64, Float, "float");
impl_tape_field!(String, Str, "string");
impl_tape_field!(Vec<u8>, Bytes, "bytes");

impl TapeField for usize {
    const TYPE_NAME: &'static str = "uint";

    fn into_value(self) -> TapeValue {
        TapeValue::UInt(self as u64)
    }

    fn from_value(value: TapeValue) -> std::result::Result<Self, TapeValue> {
        match value {
            TapeValue::UInt(v) => usize::try_from(v).map_err(|_| TapeValue::UInt(v)),
            other => Err(other),
        }
    }
}

/// Append/read cursor over checkpoint fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tape {
    values: Vec<TapeValue>,
    cursor: usize,
}

impl Tape {
    /// Create an empty tape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tape over existing values, positioned at the start.
    pub fn from_values(values: Vec<TapeValue>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Append a field.
    pub fn record<F: TapeField>(&mut self, field: F) {
        self.values.push(field.into_value());
    }

    /// Read the next field, advancing the cursor.
    ///
    /// The cursor does not move when the read fails.
    pub fn read<F: TapeField>(&mut self) -> std::result::Result<F, TapeError> {
        let offset = self.cursor;
        let value = self
            .values
            .get(offset)
            .cloned()
            .ok_or(TapeError::Exhausted { offset })?;

        let field = F::from_value(value).map_err(|found| TapeError::TypeMismatch {
            offset,
            expected: F::TYPE_NAME,
            found: found.type_name(),
        })?;

        self.cursor += 1;
        Ok(field)
    }

    /// Append `tape` as a single field holding its encoding.
    ///
    /// Nothing is recorded when encoding fails.
    pub fn record_tape(&mut self, tape: &Tape) -> std::result::Result<(), TapeError> {
        let bytes = tape.to_bytes()?;
        self.values.push(TapeValue::Bytes(bytes));
        Ok(())
    }

    /// Read a field written by [`Tape::record_tape`], positioned at its start.
    ///
    /// The cursor does not move when the read or the decode fails.
    pub fn read_tape(&mut self) -> std::result::Result<Tape, TapeError> {
        let offset = self.cursor;
        let bytes = self.read::<Vec<u8>>()?;
        match Tape::from_bytes(&bytes) {
            Ok(tape) => Ok(tape),
            Err(err) => {
                self.cursor = offset;
                Err(err)
            }
        }
    }

    /// Move the read cursor back to the first field.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Drop all fields and rewind.
    pub fn clear(&mut self) {
        self.values.clear();
        self.cursor = 0;
    }

    /// Number of recorded fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field has been recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of fields left to read.
    pub fn remaining(&self) -> usize {
        self.values.len().saturating_sub(self.cursor)
    }

    /// Whether every recorded field has been read.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the recorded fields.
    pub fn values(&self) -> &[TapeValue] {
        &self.values
    }

    /// Encode the recorded fields.
    ///
    /// The read cursor is not part of the encoding.
    pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, TapeError> {
        rkyv::to_bytes::<rancor::Error>(&self.values)
            .map(|bytes| bytes.to_vec())
            .map_err(|e| TapeError::Codec(e.to_string()))
    }

    /// Decode a tape produced by [`Tape::to_bytes`], positioned at the start.
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, TapeError> {
        let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);

        let values = rkyv::from_bytes::<Vec<TapeValue>, rancor::Error>(&aligned)
            .map_err(|e| TapeError::Codec(e.to_string()))?;
        Ok(Self::from_values(values))
    }
}
