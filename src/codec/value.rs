//! Field types and typed field values.
//!
//! A [`Schema`](crate::protocol::catalog) is an ordered list of
//! [`FieldType`]; callers supply the matching [`FieldValue`] list.
//! The value list is validated positionally against the schema before
//! any encoding happens, so a caller can never smuggle the wrong
//! native type into a field slot.

use bytes::Bytes;

/// An ordered field-type sequence describing one message's wire layout.
///
/// Schemas are immutable catalog data for the life of the process, so a
/// borrowed static slice is the whole representation.
pub type Schema = &'static [FieldType];

/// Wire type of a single message field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Signed 64-bit integer, 8 raw bytes in native byte order.
    Int,
    /// Text, NUL-terminated on the wire. Must not contain an embedded NUL.
    Str,
    /// Opaque byte blob: an 8-byte integer length prefix, then the raw bytes.
    Data,
}

impl FieldType {
    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Str => "string",
            FieldType::Data => "data",
        }
    }
}

/// A typed field value, matched positionally against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Integer field value.
    Int(i64),
    /// String field value.
    Str(String),
    /// Opaque blob field value. `Bytes` keeps clones cheap when a
    /// payload fans out to multiple consumers.
    Data(Bytes),
}

impl FieldValue {
    /// The wire type this value occupies.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Str(_) => FieldType::Str,
            FieldValue::Data(_) => FieldType::Data,
        }
    }

    /// Integer content, if this is an Int field.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// String content, if this is a Str field.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Blob content, if this is a Data field.
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Data(d) => Some(d),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<Bytes> for FieldValue {
    fn from(d: Bytes) -> Self {
        FieldValue::Data(d)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(d: &[u8]) -> Self {
        FieldValue::Data(Bytes::copy_from_slice(d))
    }
}
