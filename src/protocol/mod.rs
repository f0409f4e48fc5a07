//! Protocol module - command catalog and message payloads.
//!
//! - Per-operation request/response schemas, indexed by operation code
//! - The `Message` payload type with leading-op extraction

pub mod catalog;
mod message;

pub use catalog::{is_fire_and_forget, schema_for, Direction, OpCode, CATALOG_VERSION};
pub use message::Message;
