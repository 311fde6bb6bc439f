//! Cursor over encoded bytes.

use crate::tag::{Tag, WireType};
use crate::varint::{decode_varint, zigzag_decode32, zigzag_decode64};
use crate::WireError;
use bytes::{Buf, Bytes};
use tracing::trace;

/// Cursor that advances through wire values
///
/// Length-delimited reads hand out slices of the underlying [`Bytes`], so nested
/// messages and packed blocks are parsed without copying.
#[derive(Debug, Clone)]
pub struct WireReader {
    buf: Bytes,
}

impl WireReader {
    /// Create a reader positioned at the start of `buf`
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Whether the cursor has reached the end
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Read a raw varint
    pub fn read_varint(&mut self) -> Result<u64, WireError> {
        decode_varint(&mut self.buf)
    }

    /// Read a field key
    pub fn read_tag(&mut self) -> Result<Tag, WireError> {
        Tag::decode(&mut self.buf)
    }

    /// Read a varint length prefix and return that many bytes
    pub fn read_length_delimited(&mut self) -> Result<Bytes, WireError> {
        let len = self.read_varint()?;
        if len > self.buf.len() as u64 {
            return Err(WireError::Truncated);
        }
        Ok(self.buf.split_to(len as usize))
    }

    /// Read 4 little-endian bytes
    pub fn read_fixed32(&mut self) -> Result<u32, WireError> {
        if self.buf.len() < 4 {
            return Err(WireError::Truncated);
        }
        Ok(self.buf.get_u32_le())
    }

    /// Read 8 little-endian bytes
    pub fn read_fixed64(&mut self) -> Result<u64, WireError> {
        if self.buf.len() < 8 {
            return Err(WireError::Truncated);
        }
        Ok(self.buf.get_u64_le())
    }

    /// Read a bool; any non-zero varint is true
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        Ok(self.read_varint()? != 0)
    }

    /// Read an int32, keeping the low 32 bits of the varint
    pub fn read_int32(&mut self) -> Result<i32, WireError> {
        Ok(self.read_varint()? as i32)
    }

    /// Read an int64
    pub fn read_int64(&mut self) -> Result<i64, WireError> {
        Ok(self.read_varint()? as i64)
    }

    /// Read a uint32, keeping the low 32 bits of the varint
    pub fn read_uint32(&mut self) -> Result<u32, WireError> {
        Ok(self.read_varint()? as u32)
    }

    /// Read a uint64
    pub fn read_uint64(&mut self) -> Result<u64, WireError> {
        self.read_varint()
    }

    /// Read a zigzag-mapped sint32
    pub fn read_sint32(&mut self) -> Result<i32, WireError> {
        Ok(zigzag_decode32(self.read_varint()? as u32))
    }

    /// Read a zigzag-mapped sint64
    pub fn read_sint64(&mut self) -> Result<i64, WireError> {
        Ok(zigzag_decode64(self.read_varint()?))
    }

    /// Read an sfixed32
    pub fn read_sfixed32(&mut self) -> Result<i32, WireError> {
        Ok(self.read_fixed32()? as i32)
    }

    /// Read an sfixed64
    pub fn read_sfixed64(&mut self) -> Result<i64, WireError> {
        Ok(self.read_fixed64()? as i64)
    }

    /// Read an IEEE-754 single
    pub fn read_float(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_bits(self.read_fixed32()?))
    }

    /// Read an IEEE-754 double
    pub fn read_double(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_bits(self.read_fixed64()?))
    }

    /// Consume one value of `wire_type` without interpreting it
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), WireError> {
        let before = self.buf.len();
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.read_fixed64()?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::Fixed32 => {
                self.read_fixed32()?;
            }
        }
        trace!("skipped {} bytes of {}", before - self.buf.len(), wire_type);
        Ok(())
    }
}

impl From<&[u8]> for WireReader {
    fn from(buf: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(buf))
    }
}

impl From<Bytes> for WireReader {
    fn from(buf: Bytes) -> Self {
        Self::new(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WireWriter;

    #[test]
    fn test_read_point() {
        let mut reader = WireReader::from(&[0x08, 0x01, 0x10, 0x02][..]);

        assert_eq!(reader.read_tag().unwrap(), Tag::new(1, WireType::Varint));
        assert_eq!(reader.read_int32().unwrap(), 1);
        assert_eq!(reader.read_tag().unwrap(), Tag::new(2, WireType::Varint));
        assert_eq!(reader.read_int32().unwrap(), 2);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_scalar_values_read_back() {
        let mut writer = WireWriter::new();
        writer.append_int32(-5);
        writer.append_int64(-7);
        writer.append_uint32(u32::MAX);
        writer.append_sint32(-300);
        writer.append_sint64(i64::MIN);
        writer.append_sfixed32(-2);
        writer.append_sfixed64(-3);
        writer.append_float(2.5);
        writer.append_double(-0.125);
        writer.append_bool(true);
        writer.append_bytes(&[1, 2, 3]);

        let mut reader = WireReader::new(writer.freeze());
        assert_eq!(reader.read_int32().unwrap(), -5);
        assert_eq!(reader.read_int64().unwrap(), -7);
        assert_eq!(reader.read_uint32().unwrap(), u32::MAX);
        assert_eq!(reader.read_sint32().unwrap(), -300);
        assert_eq!(reader.read_sint64().unwrap(), i64::MIN);
        assert_eq!(reader.read_sfixed32().unwrap(), -2);
        assert_eq!(reader.read_sfixed64().unwrap(), -3);
        assert_eq!(reader.read_float().unwrap(), 2.5);
        assert_eq!(reader.read_double().unwrap(), -0.125);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_length_delimited().unwrap().as_ref(), &[1, 2, 3]);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_length_past_end() {
        let mut reader = WireReader::from(&[0x05, b'a', b'b'][..]);
        assert_eq!(reader.read_length_delimited(), Err(WireError::Truncated));
    }

    #[test]
    fn test_fixed_past_end() {
        let mut reader = WireReader::from(&[0x01, 0x02, 0x03][..]);
        assert_eq!(reader.read_fixed32(), Err(WireError::Truncated));

        let mut reader = WireReader::from(&[0x01; 7][..]);
        assert_eq!(reader.read_fixed64(), Err(WireError::Truncated));
    }

    #[test]
    fn test_skip_each_wire_type() {
        let mut writer = WireWriter::new();
        writer.append_varint(300);
        writer.append_fixed64(9);
        writer.append_string("skipped");
        writer.append_fixed32(4);
        writer.append_varint(1);

        let mut reader = WireReader::new(writer.freeze());
        reader.skip(WireType::Varint).unwrap();
        reader.skip(WireType::Fixed64).unwrap();
        reader.skip(WireType::LengthDelimited).unwrap();
        reader.skip(WireType::Fixed32).unwrap();
        assert_eq!(reader.read_varint().unwrap(), 1);
        assert!(reader.is_empty());
    }
}
