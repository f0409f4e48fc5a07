//! Command catalog - per-operation field schemas.
//!
//! A static table, indexed by operation code, giving the ordered
//! field-type schema for a request and, independently, for its
//! response. Requests always begin with an Int carrying the operation
//! code; responses always begin with an Int carrying the result code.
//! Operations with an empty response schema are fire-and-forget.
//!
//! The catalog is read-only process-wide state. Both ends of a channel
//! must run the same [`CATALOG_VERSION`]; the announce handshake
//! (see [`crate::control`]) checks this before the channel opens.

use crate::codec::{FieldType, Schema};
use crate::error::{ControlError, Result};

use FieldType::{Data, Int, Str};

/// Version of the schema tables below. Bump on any table change.
pub const CATALOG_VERSION: u32 = 1;

/// Operation code - identifies the kind of request/response on the
/// control channel. Values are stable wire constants and table indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum OpCode {
    /// Set a configuration record by name.
    RecordSet = 0,
    /// Get a configuration record by name.
    RecordGet = 1,
    /// Probe whether the served proxy process is running.
    ProxyStateGet = 2,
    /// Start or stop the served proxy process.
    ProxyStateSet = 3,
    /// Re-read configuration without restarting.
    Reconfigure = 4,
    /// Restart manager and proxy.
    Restart = 5,
    /// Restart the proxy only.
    Bounce = 6,
    /// Stop the proxy.
    Stop = 7,
    /// Drain the proxy (stop accepting new connections).
    Drain = 8,
    /// Clear a raised alarm/event by name.
    EventResolve = 9,
    /// List the names of known events.
    EventList = 10,
    /// Is the named event currently raised?
    EventActive = 11,
    /// Subscribe the calling client to event notifications.
    EventSubscribe = 12,
    /// Unsubscribe the calling client from event notifications.
    EventUnsubscribe = 13,
    /// Push an event notification to a subscribed client.
    EventNotify = 14,
    /// Reset node statistics.
    StatsReset = 15,
    /// Take a storage device offline.
    StorageDeviceOffline = 16,
    /// Get all records matching a name pattern.
    RecordMatchGet = 17,
    /// Liveness ping.
    Ping = 18,
    /// Capture a stack backtrace from the server.
    ServerBacktrace = 19,
    /// Describe a configuration record (full metadata).
    RecordDescribe = 20,
    /// Deliver an opaque lifecycle message to plugins.
    LifecycleMessage = 21,
    /// Mark an upstream host up.
    HostStatusUp = 22,
    /// Mark an upstream host down.
    HostStatusDown = 23,
    /// Sentinel for unparseable or out-of-range codes. Never on the
    /// wire as a legitimate operation; has no schemas.
    Undefined = 24,
}

/// Which half of an exchange a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

impl OpCode {
    /// Map a decoded integer onto the closed enumeration.
    ///
    /// Anything out of range becomes [`OpCode::Undefined`] so routing
    /// logic can shunt unparseable input to a generic handler instead
    /// of failing.
    pub fn from_i64(value: i64) -> OpCode {
        match value {
            0 => OpCode::RecordSet,
            1 => OpCode::RecordGet,
            2 => OpCode::ProxyStateGet,
            3 => OpCode::ProxyStateSet,
            4 => OpCode::Reconfigure,
            5 => OpCode::Restart,
            6 => OpCode::Bounce,
            7 => OpCode::Stop,
            8 => OpCode::Drain,
            9 => OpCode::EventResolve,
            10 => OpCode::EventList,
            11 => OpCode::EventActive,
            12 => OpCode::EventSubscribe,
            13 => OpCode::EventUnsubscribe,
            14 => OpCode::EventNotify,
            15 => OpCode::StatsReset,
            16 => OpCode::StorageDeviceOffline,
            17 => OpCode::RecordMatchGet,
            18 => OpCode::Ping,
            19 => OpCode::ServerBacktrace,
            20 => OpCode::RecordDescribe,
            21 => OpCode::LifecycleMessage,
            22 => OpCode::HostStatusUp,
            23 => OpCode::HostStatusDown,
            _ => OpCode::Undefined,
        }
    }
}

impl From<OpCode> for i64 {
    fn from(op: OpCode) -> i64 {
        op as i64
    }
}

// Request schemas, indexed by operation code.
static REQUESTS: &[Schema] = &[
    /* RecordSet            */ &[Int, Str, Str],
    /* RecordGet            */ &[Int, Str],
    /* ProxyStateGet        */ &[Int],
    /* ProxyStateSet        */ &[Int, Int, Int],
    /* Reconfigure          */ &[Int],
    /* Restart              */ &[Int, Int],
    /* Bounce               */ &[Int, Int],
    /* Stop                 */ &[Int, Int],
    /* Drain                */ &[Int, Int],
    /* EventResolve         */ &[Int, Str],
    /* EventList            */ &[Int],
    /* EventActive          */ &[Int, Str],
    /* EventSubscribe       */ &[Int, Str],
    /* EventUnsubscribe     */ &[Int, Str],
    /* EventNotify          */ &[Int, Str, Str],
    /* StatsReset           */ &[Int, Str],
    /* StorageDeviceOffline */ &[Int, Str],
    /* RecordMatchGet       */ &[Int, Str],
    /* Ping                 */ &[Int, Int],
    /* ServerBacktrace      */ &[Int, Int],
    /* RecordDescribe       */ &[Int, Str, Int],
    /* LifecycleMessage     */ &[Int, Str, Data],
    /* HostStatusUp         */ &[Int, Str, Str, Int],
    /* HostStatusDown       */ &[Int, Str, Str, Int],
];

// Response schemas, indexed by operation code. Empty = fire-and-forget.
static RESPONSES: &[Schema] = &[
    /* RecordSet            */ &[Int, Int],
    /* RecordGet            */ &[Int, Int, Int, Str, Data],
    /* ProxyStateGet        */ &[Int, Int],
    /* ProxyStateSet        */ &[Int],
    /* Reconfigure          */ &[Int],
    /* Restart              */ &[Int],
    /* Bounce               */ &[Int],
    /* Stop                 */ &[Int],
    /* Drain                */ &[Int],
    /* EventResolve         */ &[Int],
    /* EventList            */ &[Int, Str],
    /* EventActive          */ &[Int, Int],
    /* EventSubscribe       */ &[],
    /* EventUnsubscribe     */ &[],
    /* EventNotify          */ &[],
    /* StatsReset           */ &[Int],
    /* StorageDeviceOffline */ &[Int],
    /* RecordMatchGet       */ &[Int, Int, Int, Str, Data],
    /* Ping                 */ &[],
    /* ServerBacktrace      */ &[Int, Str],
    /* RecordDescribe       */
    &[
        Int,  // status
        Str,  // name
        Data, // value
        Data, // default
        Int,  // type
        Int,  // class
        Int,  // version
        Int,  // rsb
        Int,  // order
        Int,  // access
        Int,  // update
        Int,  // update type
        Int,  // check type
        Int,  // source
        Str,  // check expression
    ],
    /* LifecycleMessage     */ &[Int],
    /* HostStatusUp         */ &[Int],
    /* HostStatusDown       */ &[Int],
];

/// Look up the schema for `(op, direction)`.
///
/// O(1) array index. A code beyond the table or a schema with zero
/// declared fields is rejected with `InvalidOperation` - callers must
/// not attempt to encode or decode such a message. Use
/// [`is_fire_and_forget`] when the two cases need to be told apart.
pub fn schema_for(op: OpCode, direction: Direction) -> Result<Schema> {
    let table = match direction {
        Direction::Request => REQUESTS,
        Direction::Response => RESPONSES,
    };

    let idx = op as usize;
    match table.get(idx).copied() {
        Some(schema) if !schema.is_empty() => Ok(schema),
        _ => Err(ControlError::InvalidOperation(op.into())),
    }
}

/// True when `op` is a known operation whose response schema is empty
/// (the peer never replies to it).
pub fn is_fire_and_forget(op: OpCode) -> bool {
    matches!(RESPONSES.get(op as usize), Some(schema) if schema.is_empty())
}
