//! Transport module - channel capability, framing, and socket plumbing.
//!
//! - [`ControlChannel`] - exact-size reads/writes over any byte stream
//! - [`framing`] - length-prefixed send/receive of catalog messages
//! - Unix-domain control socket listener/connector (Unix only)

mod channel;
pub mod framing;
#[cfg(unix)]
mod socket;

pub use channel::ControlChannel;
pub use framing::{extract_op_code, receive, send, send_error, send_response, MAX_PAYLOAD};
#[cfg(unix)]
pub use socket::{
    connect, control_socket_path, event_socket_path, ControlSocketListener, CONTROL_SOCKET_NAME,
    EVENT_SOCKET_NAME,
};
