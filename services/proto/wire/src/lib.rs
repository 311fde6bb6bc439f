//! Protocol Buffers wire primitives for redb.
//!
//! This crate provides the byte-level layer of the message codec: varint and
//! zigzag arithmetic, field tags, and an append-only writer plus a cursor reader
//! for every wire type. It knows nothing about message schemas.
//!
//! ## Wire Format
//!
//! ```text
//! +-----------------------------+------------------------------------+
//! | varint key                  | (field_number << 3) | wire_type    |
//! +-----------------------------+------------------------------------+
//! | value                       | depends on wire_type:              |
//! |   0 varint                  |   base-128, 1..10 bytes            |
//! |   1 fixed64                 |   8 bytes little-endian            |
//! |   2 length-delimited        |   varint length + raw bytes        |
//! |   5 fixed32                 |   4 bytes little-endian            |
//! +-----------------------------+------------------------------------+
//! ```
//!
//! A message is a plain concatenation of key/value pairs with no outer framing.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod reader;
pub mod tag;
pub mod varint;
pub mod writer;

// Re-export main types
pub use error::WireError;
pub use reader::WireReader;
pub use tag::{Tag, WireType, MAX_FIELD_NUMBER};
pub use varint::{
    decode_varint, encode_varint, encoded_len_varint, zigzag_decode32, zigzag_decode64,
    zigzag_encode32, zigzag_encode64, MAX_VARINT_LEN,
};
pub use writer::WireWriter;
