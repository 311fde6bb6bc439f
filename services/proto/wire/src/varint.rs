//! Base-128 varint and zigzag arithmetic.
//!
//! Varints carry 7 value bits per byte, least significant group first. The high
//! bit of each byte is set when another byte follows.

use crate::WireError;
use bytes::{Buf, BufMut};

/// Longest legal varint encoding of a u64
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` as a varint
pub fn encode_varint<B: BufMut>(mut value: u64, buf: &mut B) {
    while value >= 0x80 {
        buf.put_u8((value as u8) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Read one varint, advancing the buffer past it
pub fn decode_varint<B: Buf>(buf: &mut B) -> Result<u64, WireError> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(WireError::Truncated);
        }
        let byte = buf.get_u8();
        // The tenth byte may only contribute the single top bit.
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(WireError::MalformedVarint);
        }
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte < 0x80 {
            return Ok(value);
        }
    }
    Err(WireError::MalformedVarint)
}

/// Number of bytes `value` occupies once varint-encoded
pub fn encoded_len_varint(value: u64) -> usize {
    // Every 7 significant bits need one byte; zero still needs one.
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Map a signed 32-bit value onto unsigned so small magnitudes stay short
pub fn zigzag_encode32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag_encode32`]
pub fn zigzag_decode32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Map a signed 64-bit value onto unsigned so small magnitudes stay short
pub fn zigzag_encode64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode64`]
pub fn zigzag_decode64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
