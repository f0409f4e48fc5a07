//! Wire marshalling - measure, encode, and decode field lists.
//!
//! Per-field layout:
//! ```text
//! ┌─────────┬──────────────────────────────┐
//! │ Int     │ 8 bytes, native order, i64   │
//! ├─────────┼──────────────────────────────┤
//! │ Str     │ UTF-8 bytes ++ one NUL byte  │
//! ├─────────┼──────────────────────────────┤
//! │ Data    │ 8-byte i64 length ++ bytes   │
//! └─────────┴──────────────────────────────┘
//! ```
//!
//! Every advance through a buffer is bounds-checked: decoding a message
//! that arrived from another process must never read past the supplied
//! slice, no matter how corrupted the content is. Encoding validates the
//! value list against the schema and the destination capacity before the
//! first byte is written, so a failed encode leaves nothing observable.

use crate::error::{ControlError, Result};

use super::value::{FieldType, FieldValue, Schema};

/// Wire size of an Int field (and of every length prefix).
pub const INT_WIRE_SIZE: usize = 8;

/// Validate a value list against a schema, positionally.
///
/// Checked before any measuring or encoding so the caller gets a
/// `SchemaMismatch` instead of a half-written buffer.
fn check_schema(schema: Schema, values: &[FieldValue]) -> Result<()> {
    if schema.len() != values.len() {
        return Err(ControlError::SchemaMismatch(format!(
            "expected {} fields, got {}",
            schema.len(),
            values.len()
        )));
    }

    for (idx, (want, got)) in schema.iter().zip(values).enumerate() {
        if *want != got.field_type() {
            return Err(ControlError::SchemaMismatch(format!(
                "field {} expects {}, got {}",
                idx,
                want.name(),
                got.field_type().name()
            )));
        }
    }

    Ok(())
}

/// Compute the exact encoded length of `values` under `schema`.
///
/// # Errors
///
/// `SchemaMismatch` if the value count or type sequence does not match
/// the schema positionally.
pub fn measure(schema: Schema, values: &[FieldValue]) -> Result<usize> {
    check_schema(schema, values)?;

    let mut len = 0usize;
    for value in values {
        len += match value {
            FieldValue::Int(_) => INT_WIRE_SIZE,
            FieldValue::Str(s) => s.len() + 1,
            FieldValue::Data(d) => INT_WIRE_SIZE + d.len(),
        };
    }

    Ok(len)
}

/// Encode `values` into `buf` in schema order.
///
/// Returns the number of bytes written (always the measured length).
///
/// # Errors
///
/// - `SchemaMismatch` - value count/types do not match the schema.
/// - `InvalidValue` - a string value contains an embedded NUL, which
///   the wire format cannot represent.
/// - `BufferTooSmall` - `buf` cannot hold the measured length.
///
/// All checks run before the first write; on error `buf` is untouched.
pub fn encode(buf: &mut [u8], schema: Schema, values: &[FieldValue]) -> Result<usize> {
    let need = measure(schema, values)?;

    for value in values {
        if let FieldValue::Str(s) = value {
            if s.as_bytes().contains(&0) {
                return Err(ControlError::InvalidValue(
                    "string field contains an embedded NUL".to_string(),
                ));
            }
        }
    }

    if buf.len() < need {
        return Err(ControlError::BufferTooSmall {
            need,
            have: buf.len(),
        });
    }

    let mut pos = 0usize;
    for value in values {
        match value {
            FieldValue::Int(v) => {
                buf[pos..pos + INT_WIRE_SIZE].copy_from_slice(&v.to_ne_bytes());
                pos += INT_WIRE_SIZE;
            }
            FieldValue::Str(s) => {
                buf[pos..pos + s.len()].copy_from_slice(s.as_bytes());
                buf[pos + s.len()] = 0;
                pos += s.len() + 1;
            }
            FieldValue::Data(d) => {
                let len = d.len() as i64;
                buf[pos..pos + INT_WIRE_SIZE].copy_from_slice(&len.to_ne_bytes());
                pos += INT_WIRE_SIZE;
                buf[pos..pos + d.len()].copy_from_slice(d);
                pos += d.len();
            }
        }
    }

    debug_assert_eq!(pos, need);
    Ok(pos)
}

/// Measure, allocate, and encode in one step.
pub fn encode_to_vec(schema: Schema, values: &[FieldValue]) -> Result<Vec<u8>> {
    let need = measure(schema, values)?;
    let mut buf = vec![0u8; need];
    encode(&mut buf, schema, values)?;
    Ok(buf)
}

/// Bounds-checked read cursor over an inbound payload.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Take exactly `n` bytes, or fail without moving.
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(ControlError::Truncated);
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_int(&mut self) -> Result<i64> {
        let raw = self.take(INT_WIRE_SIZE)?;
        let mut bytes = [0u8; INT_WIRE_SIZE];
        bytes.copy_from_slice(raw);
        Ok(i64::from_ne_bytes(bytes))
    }

    /// Read up to (and consuming) the next NUL byte.
    fn read_str(&mut self) -> Result<&'a [u8]> {
        let rest = &self.buf[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(ControlError::Truncated)?;
        let out = &rest[..nul];
        self.pos += nul + 1;
        Ok(out)
    }

    fn read_data(&mut self) -> Result<&'a [u8]> {
        let len = self.read_int()?;
        if len < 0 {
            return Err(ControlError::Truncated);
        }
        if len as u64 > self.remaining() as u64 {
            return Err(ControlError::Truncated);
        }
        self.take(len as usize)
    }
}

/// Decode `buf` against `schema`, returning the typed values.
///
/// Bytes after the last schema field are ignored. Decoding without the
/// matching schema is meaningless; callers select the schema via the
/// catalog from the message's leading operation code.
///
/// # Errors
///
/// - `Truncated` - the buffer ends before the schema is satisfied
///   (short Int, unterminated Str, Data length exceeding the remainder).
/// - `InvalidValue` - a Str field holds non-UTF-8 bytes.
pub fn decode(buf: &[u8], schema: Schema) -> Result<Vec<FieldValue>> {
    let mut cursor = Cursor::new(buf);
    let mut values = Vec::with_capacity(schema.len());

    for field in schema {
        let value = match field {
            FieldType::Int => FieldValue::Int(cursor.read_int()?),
            FieldType::Str => {
                let raw = cursor.read_str()?;
                let s = std::str::from_utf8(raw).map_err(|_| {
                    ControlError::InvalidValue("string field is not valid UTF-8".to_string())
                })?;
                FieldValue::Str(s.to_string())
            }
            FieldType::Data => FieldValue::Data(bytes::Bytes::copy_from_slice(cursor.read_data()?)),
        };
        values.push(value);
    }

    Ok(values)
}
