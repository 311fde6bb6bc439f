//! Schema-less field listing for `inspect`.

use bytes::Bytes;
use proto_wire::{WireError, WireReader, WireType};
use std::fmt;

/// Longest length-delimited payload shown as text
const PREVIEW_LEN: usize = 32;

/// Undecoded value of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(Bytes),
    Fixed32(u32),
}

/// One tagged field as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub number: u32,
    pub wire_type: WireType,
    pub value: RawValue,
}

/// Split `buf` into its top-level fields without a schema
///
/// Length-delimited payloads are not recursed into.
pub fn parse_fields(buf: Bytes) -> Result<Vec<RawField>, WireError> {
    let mut reader = WireReader::new(buf);
    let mut fields = Vec::new();

    while !reader.is_empty() {
        let tag = reader.read_tag()?;
        let value = match tag.wire_type {
            WireType::Varint => RawValue::Varint(reader.read_varint()?),
            WireType::Fixed64 => RawValue::Fixed64(reader.read_fixed64()?),
            WireType::LengthDelimited => RawValue::LengthDelimited(reader.read_length_delimited()?),
            WireType::Fixed32 => RawValue::Fixed32(reader.read_fixed32()?),
        };
        fields.push(RawField {
            number: tag.field_number,
            wire_type: tag.wire_type,
            value,
        });
    }

    Ok(fields)
}

impl fmt::Display for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}  {:<16}  ", self.number, self.wire_type.to_string())?;
        match &self.value {
            RawValue::Varint(v) => write!(f, "{}", v),
            RawValue::Fixed64(v) => write!(f, "{:#018x}", v),
            RawValue::Fixed32(v) => write!(f, "{:#010x}", v),
            RawValue::LengthDelimited(bytes) => {
                write!(f, "{} bytes", bytes.len())?;
                match printable(bytes) {
                    Some(text) => write!(f, " {:?}", text),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Short UTF-8 payloads without control characters
fn printable(bytes: &[u8]) -> Option<&str> {
    if bytes.is_empty() || bytes.len() > PREVIEW_LEN {
        return None;
    }
    let text = std::str::from_utf8(bytes).ok()?;
    (!text.chars().any(char::is_control)).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_wire_type() {
        let mut buf = vec![0x08, 0x96, 0x01]; // 1: varint 150
        buf.extend_from_slice(&[0x11, 1, 0, 0, 0, 0, 0, 0, 0]); // 2: fixed64
        buf.extend_from_slice(&[0x1A, 0x02, b'h', b'i']); // 3: bytes
        buf.extend_from_slice(&[0x25, 0xFF, 0, 0, 0]); // 4: fixed32

        let fields = parse_fields(Bytes::from(buf)).unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].value, RawValue::Varint(150));
        assert_eq!(fields[1].value, RawValue::Fixed64(1));
        assert_eq!(fields[2].value, RawValue::LengthDelimited(Bytes::from_static(b"hi")));
        assert_eq!(fields[3].wire_type, WireType::Fixed32);
        assert_eq!(fields[3].value, RawValue::Fixed32(255));
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(
            parse_fields(Bytes::from_static(&[0x1A, 0x05, b'a'])),
            Err(WireError::Truncated)
        );
    }

    #[test]
    fn test_group_wire_type_rejected() {
        assert_eq!(
            parse_fields(Bytes::from_static(&[0x0B])),
            Err(WireError::InvalidWireType(3))
        );
    }

    #[test]
    fn test_display() {
        let text = RawField {
            number: 3,
            wire_type: WireType::LengthDelimited,
            value: RawValue::LengthDelimited(Bytes::from_static(b"hi")),
        };
        assert_eq!(text.to_string(), "    3  length-delimited  2 bytes \"hi\"");

        let binary = RawField {
            number: 3,
            wire_type: WireType::LengthDelimited,
            value: RawValue::LengthDelimited(Bytes::from_static(&[0x08, 0x01])),
        };
        assert_eq!(binary.to_string(), "    3  length-delimited  2 bytes");

        let varint = RawField {
            number: 1,
            wire_type: WireType::Varint,
            value: RawValue::Varint(150),
        };
        assert_eq!(varint.to_string(), "    1  varint            150");
    }
}
