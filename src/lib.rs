//! # ctlwire
//!
//! Management control-plane messaging between a supervising manager
//! process and its clients - the served proxy process and
//! administrative command-line tools - over a local channel, plus an
//! in-process mailbox for publish/subscribe of management events.
//!
//! ## Architecture
//!
//! - **Catalog** (`protocol::catalog`): static table mapping each
//!   operation code to its request and response field schemas.
//! - **Codec** (`codec`): measures, encodes, and decodes typed field
//!   lists against a schema, bounds-checked on every advance.
//! - **Framing transport** (`transport`): length-prefixed send/receive
//!   over a channel capability (Unix socket, or any byte stream).
//! - **Mailbox & dispatch** (`mailbox`): thread-safe FIFO hand-off to
//!   a single dispatcher that fans messages out to registered
//!   callbacks.
//!
//! ## Example
//!
//! ```ignore
//! use ctlwire::codec::FieldValue;
//! use ctlwire::transport::{connect, send, receive};
//! use ctlwire::OpCode;
//!
//! let mut channel = connect("/run/proxy/mgmt.sock").await?;
//! let values = vec![
//!     FieldValue::Int(OpCode::RecordGet.into()),
//!     FieldValue::from("proxy.config.http.server_port"),
//! ];
//! send(&mut channel, OpCode::RecordGet, &values).await?;
//! let reply = receive(&mut channel).await?;
//! ```

pub mod codec;
pub mod control;
pub mod error;
pub mod mailbox;
pub mod protocol;
pub mod transport;

pub use codec::{FieldType, FieldValue};
pub use error::{ControlError, Result};
pub use mailbox::{CallbackRegistry, Mailbox, MailboxEntry};
pub use protocol::{Direction, Message, OpCode};
pub use transport::ControlChannel;
