//! Length-prefixed framing over a control channel.
//!
//! Every message on the wire is:
//! ```text
//! ┌────────────────────────┬──────────────────────┐
//! │ payload length         │ payload              │
//! │ one Int field, 8 bytes │ `length` bytes       │
//! └────────────────────────┴──────────────────────┘
//! ```
//! The length prefix is encoded with the same Int layout as any other
//! field, so the receiver decodes it first, standalone, before knowing
//! which schema applies to the rest. The payload is the request or
//! response fields in catalog order; for requests the first field is
//! always an Int carrying the operation code.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::codec::{self, FieldType, FieldValue, Schema, INT_WIRE_SIZE};
use crate::error::{ControlError, Result};
use crate::protocol::{catalog, Direction, Message, OpCode};

use super::channel::ControlChannel;

/// Schema of the standalone length prefix.
const LENGTH_SCHEMA: Schema = &[FieldType::Int];

/// Upper bound on a single message payload. A received length above
/// this is treated as stream corruption, not an allocation request.
pub const MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Measure, encode, and write one framed message.
async fn send_framed<S>(
    channel: &mut ControlChannel<S>,
    schema: Schema,
    values: &[FieldValue],
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let payload_len = codec::measure(schema, values)?;

    // Length prefix and payload in one contiguous buffer, one write.
    let mut buf = vec![0u8; INT_WIRE_SIZE + payload_len];
    codec::encode(
        &mut buf[..INT_WIRE_SIZE],
        LENGTH_SCHEMA,
        &[FieldValue::Int(payload_len as i64)],
    )?;
    codec::encode(&mut buf[INT_WIRE_SIZE..], schema, values)?;

    channel.write_exact(&buf).await
}

/// Send a request for `op` carrying `values`.
///
/// `values` must match the request schema positionally; by catalog
/// convention its first field is `op` itself as an Int.
///
/// # Errors
///
/// `NotConnected` if the channel has no stream, `InvalidOperation` if
/// the catalog has no request schema for `op`, any codec error if the
/// values do not encode, `NetWrite` if the channel write fails.
pub async fn send<S>(
    channel: &mut ControlChannel<S>,
    op: OpCode,
    values: &[FieldValue],
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if !channel.is_connected() {
        return Err(ControlError::NotConnected);
    }

    let schema = catalog::schema_for(op, Direction::Request)?;
    send_framed(channel, schema, values).await
}

/// Send the response for `op` carrying `values`.
///
/// For a fire-and-forget operation (empty response schema) this is a
/// no-op returning success: the peer is not expecting anything.
pub async fn send_response<S>(
    channel: &mut ControlChannel<S>,
    op: OpCode,
    values: &[FieldValue],
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if catalog::is_fire_and_forget(op) {
        return Ok(());
    }

    let schema = catalog::schema_for(op, Direction::Response)?;
    send_framed(channel, schema, values).await
}

/// Send an error response for `op` carrying only `error_code`.
///
/// The remaining response fields are placeholder-filled positionally
/// (Int 0, empty string, empty blob) so the peer's decode succeeds
/// even though the fields carry no meaningful data. Fire-and-forget
/// operations and the Undefined sentinel return success without
/// writing.
pub async fn send_error<S>(
    channel: &mut ControlChannel<S>,
    op: OpCode,
    error_code: i64,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if op == OpCode::Undefined || catalog::is_fire_and_forget(op) {
        return Ok(());
    }

    let schema = catalog::schema_for(op, Direction::Response)?;

    let mut values = Vec::with_capacity(schema.len());
    values.push(FieldValue::Int(error_code));
    for field in &schema[1..] {
        values.push(match field {
            FieldType::Int => FieldValue::Int(0),
            FieldType::Str => FieldValue::Str(String::new()),
            FieldType::Data => FieldValue::Data(Bytes::new()),
        });
    }

    send_framed(channel, schema, &values).await
}

/// Read one framed message off the channel.
///
/// Reads the standalone length prefix, validates it, then reads exactly
/// that many payload bytes. An empty payload after a successful length
/// read is itself an error - the protocol never sends legitimately
/// empty payloads.
pub async fn receive<S>(channel: &mut ControlChannel<S>) -> Result<Message>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if !channel.is_connected() {
        return Err(ControlError::NotConnected);
    }

    let prefix = channel.read_exact(INT_WIRE_SIZE).await?;
    let fields = codec::decode(&prefix, LENGTH_SCHEMA)?;
    let length = match fields.first().and_then(FieldValue::as_int) {
        Some(v) => v,
        None => return Err(ControlError::NetRead("unreadable length prefix".to_string())),
    };

    if length <= 0 {
        return Err(ControlError::NetRead(format!(
            "invalid payload length {}",
            length
        )));
    }
    if length as u64 > MAX_PAYLOAD as u64 {
        return Err(ControlError::NetRead(format!(
            "payload length {} exceeds maximum {}",
            length, MAX_PAYLOAD
        )));
    }

    let payload = channel.read_exact(length as usize).await?;
    Ok(Message::new(payload))
}

/// Decode only the leading operation code of a received message.
///
/// Never fails: unparseable input comes back as [`OpCode::Undefined`]
/// so dispatch can route it to a generic handler instead of crashing.
pub fn extract_op_code(message: &Message) -> OpCode {
    message.op_code()
}
