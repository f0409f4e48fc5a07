//! Message struct with typed accessors.
//!
//! A [`Message`] is one framed wire payload after the length prefix
//! has been stripped: the raw field bytes of a single request or
//! response. Uses `bytes::Bytes` so handing a payload to the mailbox
//! or fanning it out to callbacks never copies.

use bytes::Bytes;

use crate::codec::{self, FieldType};

use super::catalog::OpCode;

/// An owned control-channel payload.
#[derive(Debug, Clone)]
pub struct Message {
    /// Payload bytes (zero-copy via `bytes::Bytes`).
    payload: Bytes,
}

impl Message {
    /// Wrap received payload bytes.
    pub fn new(payload: Bytes) -> Self {
        Self { payload }
    }

    /// Wrap raw bytes (copies data).
    pub fn from_slice(payload: &[u8]) -> Self {
        Self {
            payload: Bytes::copy_from_slice(payload),
        }
    }

    /// Payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// A cheap zero-copy clone of the payload.
    #[inline]
    pub fn payload_bytes(&self) -> Bytes {
        self.payload.clone()
    }

    /// Payload length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if the payload is empty (never legitimate on the wire).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Decode only the leading operation-code field.
    ///
    /// Used on the routing hot path before the full schema is known,
    /// so it never fails: anything unreadable or out of range comes
    /// back as [`OpCode::Undefined`] and can be routed to a generic
    /// handler.
    pub fn op_code(&self) -> OpCode {
        match codec::decode(&self.payload, &[FieldType::Int]) {
            Ok(values) => match values[0].as_int() {
                Some(code) => OpCode::from_i64(code),
                None => OpCode::Undefined,
            },
            Err(_) => OpCode::Undefined,
        }
    }
}
