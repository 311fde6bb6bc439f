//! Field tags: a field number and wire type packed into one varint.

use crate::varint::{decode_varint, encode_varint};
use crate::WireError;
use bytes::{Buf, BufMut};
use std::fmt;

/// Largest field number a tag can carry (29 bits)
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Wire types as defined by the encoding
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    /// int32, int64, uint32, uint64, sint32, sint64, bool, enum
    Varint = 0,
    /// fixed64, sfixed64, double
    Fixed64 = 1,
    /// string, bytes, nested messages, packed repeated fields
    LengthDelimited = 2,
    /// fixed32, sfixed32, float
    Fixed32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            _ => Err(WireError::InvalidWireType(value)),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::Fixed32 => "fixed32",
        };
        f.write_str(name)
    }
}

/// Decoded field key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    /// Field number (1..=MAX_FIELD_NUMBER)
    pub field_number: u32,
    /// How the following value is framed
    pub wire_type: WireType,
}

impl Tag {
    /// Create a new tag
    pub fn new(field_number: u32, wire_type: WireType) -> Self {
        Self {
            field_number,
            wire_type,
        }
    }

    /// Combined key value `(field_number << 3) | wire_type`
    pub fn key(&self) -> u64 {
        (u64::from(self.field_number) << 3) | self.wire_type as u64
    }

    /// Encode the tag as a varint
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        encode_varint(self.key(), buf);
    }

    /// Decode a tag, rejecting unknown wire types and out-of-range field numbers
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self, WireError> {
        let key = decode_varint(buf)?;
        let wire_type = WireType::try_from((key & 0x07) as u8)?;
        let field_number = key >> 3;
        if field_number == 0 || field_number > u64::from(MAX_FIELD_NUMBER) {
            return Err(WireError::InvalidFieldNumber(field_number));
        }

        Ok(Self {
            field_number: field_number as u32,
            wire_type,
        })
    }
}
