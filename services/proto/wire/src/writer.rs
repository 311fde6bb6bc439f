//! Append-only encode buffer.

use crate::tag::{Tag, WireType};
use crate::varint::{encode_varint, encoded_len_varint, zigzag_encode32, zigzag_encode64};
use bytes::{BufMut, Bytes, BytesMut};

/// Append-only sink for wire values
///
/// Each `append_*` writes exactly one value with no tag. Tagged fields are
/// written as [`append_tag`](Self::append_tag) followed by the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Create an empty writer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View of the written bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Finish writing and return the bytes
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }

    /// Give back the underlying buffer
    pub fn into_inner(self) -> BytesMut {
        self.buf
    }

    /// Append a raw varint
    pub fn append_varint(&mut self, value: u64) {
        encode_varint(value, &mut self.buf);
    }

    /// Append a field key
    pub fn append_tag(&mut self, field_number: u32, wire_type: WireType) {
        Tag::new(field_number, wire_type).encode(&mut self.buf);
    }

    /// Append a varint length prefix followed by `bytes` verbatim
    pub fn append_length_delimited(&mut self, bytes: &[u8]) {
        let len = bytes.len() as u64;
        self.buf.reserve(encoded_len_varint(len) + bytes.len());
        self.append_varint(len);
        self.buf.put_slice(bytes);
    }

    /// Append 4 little-endian bytes
    pub fn append_fixed32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    /// Append 8 little-endian bytes
    pub fn append_fixed64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    /// Append a bool as a 0/1 varint
    pub fn append_bool(&mut self, value: bool) {
        self.append_varint(u64::from(value));
    }

    /// Append an int32; negative values are sign-extended to ten bytes
    pub fn append_int32(&mut self, value: i32) {
        self.append_varint(i64::from(value) as u64);
    }

    /// Append an int64 as its two's complement varint
    pub fn append_int64(&mut self, value: i64) {
        self.append_varint(value as u64);
    }

    /// Append a uint32
    pub fn append_uint32(&mut self, value: u32) {
        self.append_varint(u64::from(value));
    }

    /// Append a uint64
    pub fn append_uint64(&mut self, value: u64) {
        self.append_varint(value);
    }

    /// Append a zigzag-mapped sint32
    pub fn append_sint32(&mut self, value: i32) {
        self.append_varint(u64::from(zigzag_encode32(value)));
    }

    /// Append a zigzag-mapped sint64
    pub fn append_sint64(&mut self, value: i64) {
        self.append_varint(zigzag_encode64(value));
    }

    /// Append an sfixed32
    pub fn append_sfixed32(&mut self, value: i32) {
        self.append_fixed32(value as u32);
    }

    /// Append an sfixed64
    pub fn append_sfixed64(&mut self, value: i64) {
        self.append_fixed64(value as u64);
    }

    /// Append an IEEE-754 single
    pub fn append_float(&mut self, value: f32) {
        self.append_fixed32(value.to_bits());
    }

    /// Append an IEEE-754 double
    pub fn append_double(&mut self, value: f64) {
        self.append_fixed64(value.to_bits());
    }

    /// Append a length-prefixed UTF-8 string
    pub fn append_string(&mut self, value: &str) {
        self.append_length_delimited(value.as_bytes());
    }

    /// Append length-prefixed bytes
    pub fn append_bytes(&mut self, value: &[u8]) {
        self.append_length_delimited(value);
    }
}

impl From<BytesMut> for WireWriter {
    fn from(buf: BytesMut) -> Self {
        Self { buf }
    }
}
