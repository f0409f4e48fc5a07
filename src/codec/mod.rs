//! Codec module - schema-driven binary marshalling for control messages.
//!
//! The codec is pure and allocation-light: given a schema (an ordered
//! list of [`FieldType`]) and a matching [`FieldValue`] list it can
//! [`measure`] the exact encoded length, [`encode`] into a
//! caller-supplied buffer, and [`decode`] a received buffer back into
//! typed values. It knows nothing about sockets or framing.
//!
//! # Example
//!
//! ```
//! use ctlwire::codec::{decode, encode_to_vec, FieldType, FieldValue};
//!
//! let schema = &[FieldType::Int, FieldType::Str];
//! let values = vec![FieldValue::Int(1), FieldValue::from("proxy.config.http.server_port")];
//!
//! let buf = encode_to_vec(schema, &values).unwrap();
//! assert_eq!(decode(&buf, schema).unwrap(), values);
//! ```

mod marshal;
mod value;

pub use marshal::{decode, encode, encode_to_vec, measure, INT_WIRE_SIZE};
pub use value::{FieldType, FieldValue, Schema};
